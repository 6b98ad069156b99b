//! CLI entry-point for yearly reaction trends.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, data::openfda::OpenFdaClient, signals::Aggregator};

/// Args for the `trend` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Comma separated MedDRA preferred terms.
    #[arg(long, value_delimiter = ',', required = true)]
    pub reactions: Vec<String>,
    /// First receive date (YYYYMMDD).
    #[arg(long, default_value = "20040101", value_parser = super::parse_date)]
    pub from: NaiveDate,
    /// Last receive date (YYYYMMDD).
    #[arg(long, default_value = "20240630", value_parser = super::parse_date)]
    pub to: NaiveDate,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let client = OpenFdaClient::new(&settings).context("building OpenFDA client")?;
    let aggregator = Aggregator::new(&client);

    for reaction in &args.reactions {
        let trend = aggregator
            .reaction_trend(reaction, args.from, args.to)
            .await
            .with_context(|| format!("trend for {reaction}"))?;
        println!(
            "{} (total {}, latest-year z {:.2})",
            trend.reaction,
            trend.total(),
            trend.latest_z
        );
        for (year, count) in &trend.years {
            println!("  {year}\t{count}");
        }
    }
    Ok(())
}
