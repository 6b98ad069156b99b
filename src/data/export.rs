//! Delimited-text export of per-pair signal rows.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::{
    error::SignalError,
    signals::{DisproportionalityResult, SignalRow},
};

/// Flat CSV record. Undefined statistics leave their columns empty and put
/// the reason in `note`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub drug: String,
    pub reaction: String,
    pub a: u64,
    pub drug_total: u64,
    pub reaction_total: u64,
    pub grand_total: u64,
    pub ror: Option<f64>,
    pub ror_lower: Option<f64>,
    pub ror_upper: Option<f64>,
    pub prr: Option<f64>,
    pub prr_lower: Option<f64>,
    pub prr_upper: Option<f64>,
    pub signal: bool,
    pub note: String,
}

impl From<&SignalRow> for SignalRecord {
    fn from(row: &SignalRow) -> Self {
        let (ror, ror_lower, ror_upper) = split(&row.ror);
        let (prr, prr_lower, prr_upper) = split(&row.prr);
        let note = [&row.ror, &row.prr]
            .into_iter()
            .filter_map(|result| result.as_ref().err().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            drug: row.drug.clone(),
            reaction: row.reaction.clone(),
            a: row.table.a(),
            drug_total: row.table.drug_total(),
            reaction_total: row.table.reaction_total(),
            grand_total: row.table.grand_total(),
            ror,
            ror_lower,
            ror_upper,
            prr,
            prr_lower,
            prr_upper,
            signal: row.is_signal(),
            note,
        }
    }
}

fn split(
    result: &Result<DisproportionalityResult, SignalError>,
) -> (Option<f64>, Option<f64>, Option<f64>) {
    match result {
        Ok(r) => (Some(r.estimate), Some(r.lower), Some(r.upper)),
        Err(_) => (None, None, None),
    }
}

/// Write `rows` as CSV with a header line.
pub fn write_signals_csv(path: &Path, rows: &[SignalRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        writer.serialize(SignalRecord::from(row))?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote signal table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::ContingencyTable;

    #[test]
    fn undefined_statistic_becomes_empty_columns_with_note() {
        let row = SignalRow::from_table("DRUG", "RASH", ContingencyTable::new(6, 0, 3, 91));
        let record = SignalRecord::from(&row);
        assert_eq!(record.ror, None);
        assert!(record.prr.is_some());
        assert_eq!(record.note, "ROR is undefined: cell b is zero");
        assert_eq!(record.drug_total, 6);
        assert_eq!(record.grand_total, 100);
    }
}
