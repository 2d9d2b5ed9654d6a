//! Error and warning types for the ABC analysis
//!
//! Structural problems abort the run before any classification happens and are
//! reported as [`AbcError`]. Data-quality and degenerate-input conditions are
//! absorbed by the pipeline and returned alongside the results as
//! [`AnalysisWarning`]s.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors: the pipeline stops and no partial results are produced
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AbcError {
    /// Identifier, number or name columns are not present in the input
    #[error("required columns are missing: {missing:?} (found columns: {found:?})")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// One or more of the configured period columns are not present
    #[error("period columns are missing: {missing:?} (found columns: {found:?})")]
    MissingPeriodColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// A record carries a different number of period counts than the table header
    #[error("article at row {row} has {actual} period counts, expected {expected}")]
    InconsistentPeriodLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Window size outside 1..=P
    #[error("window size {window} is invalid for {periods} periods (expected 1..={periods})")]
    InvalidWindow { window: usize, periods: usize },

    /// Tier thresholds or labels do not form a valid scheme
    #[error("invalid tier scheme: {0}")]
    InvalidTierScheme(String),

    /// Input file does not exist
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input file exists but holds no data
    #[error("input file is empty: {}", .0.display())]
    EmptyFile(PathBuf),
}

/// Non-fatal conditions surfaced to the caller together with the results
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisWarning {
    /// Absent period counts were found; they were counted as zero in window sums
    /// and skipped in the per-period statistics. Raised at most once per batch.
    #[error("{absent_cells} absent period values in {affected_articles} articles; they are ignored for the analysis")]
    MissingValues {
        absent_cells: usize,
        affected_articles: usize,
    },
    /// Total window volume is zero; every article got the fallback tier
    #[error("total movement volume is zero; all articles assigned tier {fallback_tier} as a fallback")]
    ZeroVolume { fallback_tier: String },
    /// The table holds no articles; all results are empty
    #[error("no articles to classify")]
    EmptyInput,
}
