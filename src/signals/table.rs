//! 2x2 contingency table for one (drug, reaction) pair.

use serde::Serialize;

use crate::error::{AggregationError, Cell};

/// Report counts split by drug and reaction exposure.
///
/// |               | reaction | no reaction |
/// |---------------|----------|-------------|
/// | **drug**      | a        | b           |
/// | **no drug**   | c        | d           |
///
/// Cells are non-negative by construction and the table is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContingencyTable {
    a: u64,
    b: u64,
    c: u64,
    d: u64,
}

impl ContingencyTable {
    pub fn new(a: u64, b: u64, c: u64, d: u64) -> Self {
        Self { a, b, c, d }
    }

    /// Derive the cells from the aggregated marginal counts.
    pub fn from_marginals(
        co_occurrence: u64,
        drug_total: u64,
        reaction_total: u64,
        grand_total: u64,
    ) -> Result<Self, AggregationError> {
        let a = co_occurrence;
        if a > drug_total {
            return Err(AggregationError::CoOccurrenceExceedsDrugTotal { a, drug_total });
        }
        if a > reaction_total {
            return Err(AggregationError::CoOccurrenceExceedsReactionTotal { a, reaction_total });
        }
        let b = drug_total - a;
        let c = reaction_total - a;
        // a + b + c is the union of drug and reaction reports
        let marginal_sum = a
            .checked_add(b)
            .and_then(|sum| sum.checked_add(c))
            .ok_or(AggregationError::NegativeCell {
                cell: Cell::D,
                grand_total,
                marginal_sum: u64::MAX,
            })?;
        let d = grand_total
            .checked_sub(marginal_sum)
            .ok_or(AggregationError::NegativeCell {
                cell: Cell::D,
                grand_total,
                marginal_sum,
            })?;
        Ok(Self { a, b, c, d })
    }

    pub fn a(&self) -> u64 {
        self.a
    }

    pub fn b(&self) -> u64 {
        self.b
    }

    pub fn c(&self) -> u64 {
        self.c
    }

    pub fn d(&self) -> u64 {
        self.d
    }

    pub fn cell(&self, cell: Cell) -> u64 {
        match cell {
            Cell::A => self.a,
            Cell::B => self.b,
            Cell::C => self.c,
            Cell::D => self.d,
        }
    }

    /// a + b, saturating at `u64::MAX`.
    pub fn drug_total(&self) -> u64 {
        self.a.saturating_add(self.b)
    }

    /// a + c, saturating at `u64::MAX`.
    pub fn reaction_total(&self) -> u64 {
        self.a.saturating_add(self.c)
    }

    /// a + b + c + d, saturating at `u64::MAX`.
    pub fn grand_total(&self) -> u64 {
        self.drug_total()
            .saturating_add(self.c)
            .saturating_add(self.d)
    }

    /// First cell among `cells` that is zero, in the order given.
    pub(crate) fn first_zero(&self, cells: &[Cell]) -> Option<Cell> {
        cells.iter().copied().find(|cell| self.cell(*cell) == 0)
    }

    pub(crate) fn as_f64(&self) -> (f64, f64, f64, f64) {
        (self.a as f64, self.b as f64, self.c as f64, self.d as f64)
    }
}
