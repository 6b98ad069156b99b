//! Disproportionality analysis of OpenFDA adverse-event reports.
//!
//! Counts are pulled through a rate-limited [`data::openfda::CountQueryClient`],
//! folded into 2x2 [`signals::ContingencyTable`]s and scored with the reporting
//! odds ratio and the proportional reporting ratio.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod signals;
