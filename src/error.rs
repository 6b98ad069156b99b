//! Error types shared by the count client and the signal engine.

use std::fmt;

/// Failures raised while talking to the OpenFDA backend.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenFDA returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OpenFDA rate limit still exceeded after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("could not decode OpenFDA response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not parse field metadata YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("OpenFDA response carried no meta.results.total")]
    MissingTotal,
}

/// One of the four cells of a 2x2 contingency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    A,
    B,
    C,
    D,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cell::A => "a",
            Cell::B => "b",
            Cell::C => "c",
            Cell::D => "d",
        };
        f.write_str(name)
    }
}

/// Disproportionality statistic kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Statistic {
    #[serde(rename = "ROR")]
    Ror,
    #[serde(rename = "PRR")]
    Prr,
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Ror => f.write_str("ROR"),
            Statistic::Prr => f.write_str("PRR"),
        }
    }
}

/// Upstream counts that cannot form a contingency table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("co-occurrence count {a} exceeds drug total {drug_total}")]
    CoOccurrenceExceedsDrugTotal { a: u64, drug_total: u64 },

    #[error("co-occurrence count {a} exceeds reaction total {reaction_total}")]
    CoOccurrenceExceedsReactionTotal { a: u64, reaction_total: u64 },

    #[error("cell {cell} would be negative (grand total {grand_total} < a+b+c = {marginal_sum})")]
    NegativeCell {
        cell: Cell,
        grand_total: u64,
        marginal_sum: u64,
    },
}

/// Structural or mathematical failures of the disproportionality core.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SignalError {
    #[error(
        "no aggregation term matched reaction '{reaction}' for drug '{drug}'{}",
        closest_hint(.closest)
    )]
    TermMatching {
        drug: String,
        reaction: String,
        closest: Option<String>,
    },

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("{statistic} is undefined: cell {cell} is zero")]
    DivisionInvalid { statistic: Statistic, cell: Cell },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

fn closest_hint(closest: &Option<String>) -> String {
    closest
        .as_deref()
        .map(|term| format!(" (closest returned term: '{term}')"))
        .unwrap_or_default()
}

/// A [`SignalError`] tagged with the (drug, reaction) pair being processed.
#[derive(thiserror::Error, Debug)]
#[error("{drug} / {reaction}: {source}")]
pub struct PairError {
    pub drug: String,
    pub reaction: String,
    #[source]
    pub source: SignalError,
}
