//! Data access: OpenFDA counts, field metadata and CSV export.

pub mod export;
pub mod metadata;
pub mod openfda;
