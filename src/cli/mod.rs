//! Command-line interface wiring for fda-signal.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod counts;
pub mod fields;
pub mod signal;
pub mod trend;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Disproportionality analysis over OpenFDA adverse-event reports",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Signal(args) => signal::run(args, settings).await,
            Commands::Counts(args) => counts::run(args, settings).await,
            Commands::Trend(args) => trend::run(args, settings).await,
            Commands::Fields(args) => fields::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute ROR and PRR for a drug against reaction terms.
    Signal(signal::Args),
    /// Rank terms of any field by report count.
    Counts(counts::Args),
    /// Yearly report counts for reaction terms.
    Trend(trend::Args),
    /// Browse the drug-event field metadata.
    Fields(fields::Args),
}

/// Parse a `YYYYMMDD` or `YYYY-MM-DD` date argument.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|err| format!("invalid date '{raw}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_both_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(parse_date("20240630").unwrap(), expected);
        assert_eq!(parse_date("2024-06-30").unwrap(), expected);
        assert!(parse_date("June").is_err());
    }

    #[test]
    fn signal_reactions_split_on_commas() {
        let cli = Cli::try_parse_from([
            "fda-signal",
            "signal",
            "--drug",
            "nexletol",
            "--reactions",
            "MYALGIA,NAUSEA/VOMITING",
        ])
        .unwrap();
        match cli.command {
            Commands::Signal(args) => {
                assert_eq!(args.reactions, vec!["MYALGIA", "NAUSEA/VOMITING"]);
                assert_eq!(args.top, 10);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
