//! Proportional reporting ratio computations.

use crate::error::{Cell, SignalError, Statistic};

use super::{table::ContingencyTable, DisproportionalityResult};

/// Proportional reporting ratio with 95% confidence interval.
///
/// PRR = (a/(a+b)) / (c/(c+d)),
/// se(ln PRR) = sqrt(1/a − 1/(a+b) + 1/c − 1/(c+d)).
/// Only `a` and `c` must be positive; `b` and `d` may be zero.
pub fn proportional_reporting_ratio(
    table: &ContingencyTable,
) -> Result<DisproportionalityResult, SignalError> {
    if let Some(cell) = table.first_zero(&[Cell::A, Cell::C]) {
        return Err(SignalError::DivisionInvalid {
            statistic: Statistic::Prr,
            cell,
        });
    }
    let (a, b, c, d) = table.as_f64();
    let prr = (a / (a + b)) / (c / (c + d));
    let variance = (1.0 / a) - (1.0 / (a + b)) + (1.0 / c) - (1.0 / (c + d));
    // rounding can push an exact zero slightly negative
    let se = variance.max(0.0).sqrt();
    Ok(DisproportionalityResult::from_log_normal(
        Statistic::Prr,
        prr,
        se,
    ))
}
