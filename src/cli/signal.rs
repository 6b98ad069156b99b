//! CLI entry-point for computing ROR/PRR signals for one drug.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    data::{export, openfda::OpenFdaClient},
    signals::{self, Aggregator, SignalRow},
};

/// Args for the `signal` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Suspect medicinal product, matched as an exact term.
    #[arg(long)]
    pub drug: String,
    /// Comma separated MedDRA preferred terms. Defaults to the drug's most
    /// reported reactions.
    #[arg(long, value_delimiter = ',')]
    pub reactions: Vec<String>,
    /// How many top reactions to score when none are given.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
    /// Pairs aggregated at once; requests still share one rate limit.
    #[arg(long, default_value_t = 2)]
    pub concurrency: usize,
    /// CSV destination, defaults to `<OUTPUTS_DIR>/signals_<drug>.csv`.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let client = OpenFdaClient::new(&settings).context("building OpenFDA client")?;
    let aggregator = Aggregator::new(&client);

    let reactions = if args.reactions.is_empty() {
        let top = aggregator
            .top_reactions(&args.drug, args.top)
            .await
            .with_context(|| format!("top reactions for {}", args.drug))?;
        top.into_iter().map(|bucket| bucket.term).collect()
    } else {
        args.reactions.clone()
    };
    if reactions.is_empty() {
        bail!("no reports found for drug {}", args.drug);
    }

    let grand_total = aggregator
        .grand_total()
        .await
        .context("fetching total report count")?;
    info!(grand_total, "fetched grand total");

    let results = signals::evaluate_reactions(
        &aggregator,
        &args.drug,
        &reactions,
        grand_total,
        args.concurrency,
    )
    .await;

    let mut rows = Vec::new();
    for result in results {
        match result {
            Ok(row) => rows.push(row),
            Err(err) => warn!(%err, "pair skipped"),
        }
    }
    if rows.is_empty() {
        bail!("no reaction could be scored for {}", args.drug);
    }

    print_rows(&rows);

    let path = args.output.clone().unwrap_or_else(|| {
        settings.join_output(format!("signals_{}.csv", file_stem(&args.drug)))
    });
    export::write_signals_csv(&path, &rows)
}

fn print_rows(rows: &[SignalRow]) {
    println!(
        "{:<32} {:>8} {:>10} {:>10} {:>24} {:>24}",
        "reaction", "a", "a+b", "a+c", "ROR [95% CI]", "PRR [95% CI]"
    );
    for row in rows {
        let flag = if row.is_signal() { " *" } else { "" };
        println!(
            "{:<32} {:>8} {:>10} {:>10} {:>24} {:>24}{flag}",
            row.reaction,
            row.table.a(),
            row.table.drug_total(),
            row.table.reaction_total(),
            interval(&row.ror),
            interval(&row.prr),
        );
    }
}

fn interval<E>(result: &Result<signals::DisproportionalityResult, E>) -> String {
    match result {
        Ok(r) => format!("{:.2} [{:.2}, {:.2}]", r.estimate, r.lower, r.upper),
        Err(_) => "n/a".to_string(),
    }
}

fn file_stem(drug: &str) -> String {
    drug.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
