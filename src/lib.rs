//! ABCForge: a Rust CLI application for ABC inventory analysis
//!
//! This library ranks articles by their movements over the most recent
//! reporting periods, computes the cumulative share of total movement volume,
//! and partitions the articles into tiers (A/B/C by default) by threshold
//! crossing.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod report;
pub mod stats;

// Re-export public items for easier access
pub use cli::Args;
pub use config::{AnalysisConfig, ColumnLayout, TierRule, TierScheme};
pub use data::{load_articles, CsvDialect};
pub use error::{AbcError, AnalysisWarning};
pub use model::{
    run_analysis, AbcAnalysis, ArticleRecord, ArticleTable, ClassifiedArticle, RankedArticle,
    TierSummary, TierSummaryEntry,
};
pub use stats::{period_statistics, PeriodStatistics};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
