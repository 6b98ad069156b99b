//! CLI entry-point for ranked term counts of any field.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{config::Settings, data::openfda::OpenFdaClient};

/// Args for the `counts` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Field to group by, e.g. patient.drug.activesubstance.activesubstancename.exact.
    #[arg(long)]
    pub field: String,
    /// Optional OpenFDA search filter scoping the reports.
    #[arg(long, default_value = "")]
    pub search: String,
    /// Result cap, defaults to OPENFDA_DEFAULT_LIMIT.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let client = OpenFdaClient::new(&settings).context("building OpenFDA client")?;
    let limit = args.limit.unwrap_or(settings.default_limit);
    let counts = client
        .query_counts_limited(&args.search, &args.field, limit)
        .await
        .with_context(|| format!("counting {}", args.field))?;
    info!(field = %args.field, terms = counts.len(), "fetched counts");

    for bucket in &counts {
        println!("{}\t{}", bucket.term, bucket.count);
    }
    Ok(())
}
