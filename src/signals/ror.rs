//! Reporting odds ratio computations.

use crate::error::{Cell, SignalError, Statistic};

use super::{table::ContingencyTable, DisproportionalityResult};

/// Reporting odds ratio with 95% confidence interval.
///
/// ROR = (a·d)/(b·c), se(ln ROR) = sqrt(1/a + 1/b + 1/c + 1/d). Every cell
/// must be positive; a zero cell is reported rather than corrected.
pub fn reporting_odds_ratio(
    table: &ContingencyTable,
) -> Result<DisproportionalityResult, SignalError> {
    if let Some(cell) = table.first_zero(&[Cell::A, Cell::B, Cell::C, Cell::D]) {
        return Err(SignalError::DivisionInvalid {
            statistic: Statistic::Ror,
            cell,
        });
    }
    let (a, b, c, d) = table.as_f64();
    let ror = (a * d) / (b * c);
    let variance = (1.0 / a) + (1.0 / b) + (1.0 / c) + (1.0 / d);
    Ok(DisproportionalityResult::from_log_normal(
        Statistic::Ror,
        ror,
        variance.sqrt(),
    ))
}
