//! Disproportionality analysis: contingency tables, ROR and PRR.

pub mod aggregate;
pub mod prr;
pub mod ror;
pub mod table;
pub mod terms;
pub mod trend;

use futures::stream::{self, StreamExt};
use indexmap::IndexSet;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    data::openfda::CountQueryClient,
    error::{PairError, SignalError, Statistic},
};

pub use aggregate::{Aggregator, CountFields};
pub use prr::proportional_reporting_ratio;
pub use ror::reporting_odds_ratio;
pub use table::ContingencyTable;

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Point estimate and 95% confidence bounds of one statistic, rounded to four
/// decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisproportionalityResult {
    pub statistic: Statistic,
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
}

impl DisproportionalityResult {
    /// Bounds of a log-normally distributed ratio: exp(ln(x) ± 1.96·se).
    pub(crate) fn from_log_normal(statistic: Statistic, estimate: f64, se_log: f64) -> Self {
        let log_estimate = estimate.ln();
        let lower = (log_estimate - Z_95 * se_log).exp().min(estimate);
        let upper = (log_estimate + Z_95 * se_log).exp().max(estimate);
        Self {
            statistic,
            estimate: round4(estimate),
            lower: round4(lower),
            upper: round4(upper),
        }
    }

    /// Lower bound above one.
    pub fn is_signal(&self) -> bool {
        self.lower > 1.0
    }
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Everything computed for one (drug, reaction) pair.
#[derive(Debug)]
pub struct SignalRow {
    pub drug: String,
    pub reaction: String,
    pub table: ContingencyTable,
    pub ror: Result<DisproportionalityResult, SignalError>,
    pub prr: Result<DisproportionalityResult, SignalError>,
}

impl SignalRow {
    pub fn from_table(
        drug: impl Into<String>,
        reaction: impl Into<String>,
        table: ContingencyTable,
    ) -> Self {
        Self {
            drug: drug.into(),
            reaction: reaction.into(),
            ror: reporting_odds_ratio(&table),
            prr: proportional_reporting_ratio(&table),
            table,
        }
    }

    /// Either statistic has a lower bound above one.
    pub fn is_signal(&self) -> bool {
        [&self.ror, &self.prr]
            .into_iter()
            .any(|result| result.as_ref().is_ok_and(|r| r.is_signal()))
    }
}

/// Aggregate and score one pair.
pub async fn evaluate_pair<C>(
    aggregator: &Aggregator<'_, C>,
    drug: &str,
    reaction: &str,
    grand_total: u64,
) -> Result<SignalRow, PairError>
where
    C: CountQueryClient + ?Sized,
{
    let table = aggregator
        .build_table(drug, reaction, grand_total)
        .await
        .map_err(|source| PairError {
            drug: drug.to_string(),
            reaction: reaction.to_string(),
            source,
        })?;
    let row = SignalRow::from_table(drug, reaction, table);
    for result in [&row.ror, &row.prr] {
        if let Err(err) = result {
            warn!(%drug, %reaction, %err, "statistic undefined");
        }
    }
    Ok(row)
}

/// Score `drug` against every reaction, in input order. Reactions that
/// normalise to the same term are scored once, keeping the first spelling.
pub async fn evaluate_reactions<C>(
    aggregator: &Aggregator<'_, C>,
    drug: &str,
    reactions: &[String],
    grand_total: u64,
    concurrency: usize,
) -> Vec<Result<SignalRow, PairError>>
where
    C: CountQueryClient + ?Sized,
{
    let mut seen = IndexSet::new();
    let unique: Vec<&String> = reactions
        .iter()
        .filter(|reaction| seen.insert(terms::normalize_term(reaction).to_ascii_uppercase()))
        .collect();
    info!(%drug, reactions = unique.len(), "evaluating reactions");

    stream::iter(unique)
        .map(|reaction| evaluate_pair(aggregator, drug, reaction, grand_total))
        .buffered(concurrency.max(1))
        .collect()
        .await
}
