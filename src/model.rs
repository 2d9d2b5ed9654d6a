//! ABC classification pipeline: aggregate, rank, assign tiers, summarize
//!
//! The pipeline is a pure function of the article table and the
//! [`AnalysisConfig`]. Data flows strictly downstream:
//! [`aggregate`] → [`rank`] → [`assign_tiers`] → [`summarize`].

use crate::config::{AnalysisConfig, TierScheme};
use crate::error::{AbcError, AnalysisWarning};
use crate::stats::{period_statistics, PeriodStatistics};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// One input row: identifiers plus one count per reporting period
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub id: String,
    pub number: String,
    pub name: String,
    /// Period counts, oldest first; `None` marks an absent or unparseable value
    pub periods: Vec<Option<f64>>,
}

impl ArticleRecord {
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
        name: impl Into<String>,
        periods: Vec<Option<f64>>,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            name: name.into(),
            periods,
        }
    }

    /// Count of period `index`, treating NaN as absent
    pub fn count(&self, index: usize) -> Option<f64> {
        self.periods
            .get(index)
            .copied()
            .flatten()
            .filter(|value| !value.is_nan())
    }
}

/// Loaded table: period names plus records that all carry exactly one count per period
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleTable {
    period_names: Vec<String>,
    records: Vec<ArticleRecord>,
}

impl ArticleTable {
    /// Build a table, rejecting any record whose period count differs from the header
    pub fn new(period_names: Vec<String>, records: Vec<ArticleRecord>) -> Result<Self, AbcError> {
        let expected = period_names.len();
        if let Some((row, record)) = records
            .iter()
            .enumerate()
            .find(|(_, record)| record.periods.len() != expected)
        {
            return Err(AbcError::InconsistentPeriodLength {
                row,
                expected,
                actual: record.periods.len(),
            });
        }

        Ok(Self {
            period_names,
            records,
        })
    }

    pub fn period_names(&self) -> &[String] {
        &self.period_names
    }

    pub fn period_count(&self) -> usize {
        self.period_names.len()
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Aggregator output for one article
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowedArticle<'a> {
    pub record: &'a ArticleRecord,
    /// Sum of the last `window` period counts, absent counts contributing zero
    pub window_sum: f64,
}

/// Aggregator output for the whole table, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation<'a> {
    pub articles: Vec<WindowedArticle<'a>>,
    /// Single batch-level warning if any period count anywhere was absent
    pub missing_values: Option<AnalysisWarning>,
}

/// Article in final rank order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedArticle<'a> {
    pub record: &'a ArticleRecord,
    pub window_sum: f64,
    /// 0-based position after sorting
    pub rank_position: usize,
}

/// Ranked article with its cumulative share and assigned tier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedArticle<'a> {
    pub ranked: RankedArticle<'a>,
    pub cumulative_sum: f64,
    /// `None` when total volume is zero and percentages are undefined
    pub cumulative_percentage: Option<f64>,
    pub tier: String,
}

impl<'a> ClassifiedArticle<'a> {
    pub fn record(&self) -> &'a ArticleRecord {
        self.ranked.record
    }

    pub fn window_sum(&self) -> f64 {
        self.ranked.window_sum
    }

    pub fn rank_position(&self) -> usize {
        self.ranked.rank_position
    }
}

/// Tier Assigner output
#[derive(Debug, Clone, PartialEq)]
pub struct TierAssignment<'a> {
    pub articles: Vec<ClassifiedArticle<'a>>,
    pub total_volume: f64,
    /// Total volume was zero and every article received the fallback tier
    pub degenerate: bool,
}

/// Counts and shares of one observed tier, relative to the whole population
#[derive(Debug, Clone, PartialEq)]
pub struct TierSummaryEntry {
    pub tier: String,
    pub article_count: usize,
    pub volume: f64,
    pub percent_articles: f64,
    /// `None` when total volume is zero
    pub percent_volume: Option<f64>,
}

/// Per-tier summary in tier-scheme order, observed tiers only
#[derive(Debug, Clone, PartialEq)]
pub struct TierSummary {
    pub entries: Vec<TierSummaryEntry>,
    pub total_articles: usize,
    pub total_volume: f64,
}

impl TierSummary {
    pub fn get(&self, tier: &str) -> Option<&TierSummaryEntry> {
        self.entries.iter().find(|entry| entry.tier == tier)
    }

    pub fn article_count(&self, tier: &str) -> usize {
        self.get(tier).map_or(0, |entry| entry.article_count)
    }
}

/// Full result of one analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AbcAnalysis<'a> {
    /// Classified articles in rank order
    pub articles: Vec<ClassifiedArticle<'a>>,
    pub summary: TierSummary,
    /// Per-period descriptive statistics, reporting only
    pub statistics: Vec<PeriodStatistics>,
    pub warnings: Vec<AnalysisWarning>,
    pub window: usize,
}

impl<'a> AbcAnalysis<'a> {
    /// First `n` articles in rank order
    pub fn top(&self, n: usize) -> &[ClassifiedArticle<'a>] {
        &self.articles[..n.min(self.articles.len())]
    }

    pub fn is_degenerate(&self) -> bool {
        self.warnings
            .iter()
            .any(|warning| matches!(warning, AnalysisWarning::ZeroVolume { .. }))
    }
}

/// Sum the last `window` periods of every record
pub fn aggregate(table: &ArticleTable, window: usize) -> Result<Aggregation<'_>, AbcError> {
    let periods = table.period_count();
    if window == 0 || window > periods {
        return Err(AbcError::InvalidWindow { window, periods });
    }
    let window_start = periods - window;

    let mut absent_cells = 0;
    let mut affected_articles = 0;
    let articles = table
        .records()
        .iter()
        .map(|record| {
            let absent = (0..periods).filter(|&i| record.count(i).is_none()).count();
            if absent > 0 {
                absent_cells += absent;
                affected_articles += 1;
            }
            // Folding from +0.0 keeps all-absent windows at +0.0 rather than -0.0
            let window_sum = (window_start..periods)
                .filter_map(|i| record.count(i))
                .fold(0.0, |acc, value| acc + value);
            WindowedArticle { record, window_sum }
        })
        .collect();

    let missing_values = (absent_cells > 0).then_some(AnalysisWarning::MissingValues {
        absent_cells,
        affected_articles,
    });

    Ok(Aggregation {
        articles,
        missing_values,
    })
}

/// Stable sort by window sum, descending; equal sums keep input order
pub fn rank(mut articles: Vec<WindowedArticle<'_>>) -> Vec<RankedArticle<'_>> {
    articles.sort_by(|a, b| {
        b.window_sum
            .partial_cmp(&a.window_sum)
            .unwrap_or(Ordering::Equal)
    });
    articles
        .into_iter()
        .enumerate()
        .map(|(rank_position, article)| RankedArticle {
            record: article.record,
            window_sum: article.window_sum,
            rank_position,
        })
        .collect()
}

/// Walk rank order accumulating the running share of total volume and classify
/// each article by its own cumulative percentage.
pub fn assign_tiers<'a>(ranked: Vec<RankedArticle<'a>>, scheme: &TierScheme) -> TierAssignment<'a> {
    // Summed in rank order so the last cumulative sum equals the total exactly
    let total_volume: f64 = ranked.iter().map(|article| article.window_sum).sum();
    let degenerate = total_volume == 0.0 && !ranked.is_empty();

    let mut cumulative_sum = 0.0;
    let articles = ranked
        .into_iter()
        .map(|ranked| {
            cumulative_sum += ranked.window_sum;
            let (cumulative_percentage, tier) = if total_volume == 0.0 {
                (None, scheme.fallback())
            } else {
                let percentage = cumulative_sum / total_volume * 100.0;
                (Some(percentage), scheme.classify(percentage))
            };
            ClassifiedArticle {
                ranked,
                cumulative_sum,
                cumulative_percentage,
                tier: tier.to_string(),
            }
        })
        .collect();

    TierAssignment {
        articles,
        total_volume,
        degenerate,
    }
}

/// Recompute the per-tier summary from the full classified sequence
pub fn summarize(articles: &[ClassifiedArticle<'_>], scheme: &TierScheme) -> TierSummary {
    let total_articles = articles.len();
    let total_volume: f64 = articles.iter().map(|article| article.window_sum()).sum();

    let entries = scheme
        .labels()
        .filter_map(|label| {
            let members: Vec<&ClassifiedArticle<'_>> =
                articles.iter().filter(|article| article.tier == label).collect();
            if members.is_empty() {
                return None;
            }
            let article_count = members.len();
            let volume: f64 = members.iter().map(|article| article.window_sum()).sum();
            Some(TierSummaryEntry {
                tier: label.to_string(),
                article_count,
                volume,
                percent_articles: article_count as f64 / total_articles as f64 * 100.0,
                percent_volume: (total_volume != 0.0).then(|| volume / total_volume * 100.0),
            })
        })
        .collect();

    TierSummary {
        entries,
        total_articles,
        total_volume,
    }
}

/// Run the full pipeline over a loaded table
///
/// # Arguments
/// * `table` - Articles with their per-period counts
/// * `config` - Window size and tier scheme
///
/// # Returns
/// * `AbcAnalysis` borrowing the records of `table`, or a structural error
pub fn run_analysis<'a>(
    table: &'a ArticleTable,
    config: &AnalysisConfig,
) -> Result<AbcAnalysis<'a>, AbcError> {
    config.validate_window(table.period_count())?;

    let mut warnings = Vec::new();
    let statistics = period_statistics(table);

    let aggregation = aggregate(table, config.window)?;
    if let Some(warning) = aggregation.missing_values {
        warn!("{}", warning);
        warnings.push(warning);
    }

    let ranked = rank(aggregation.articles);
    debug!("Ranked {} articles over the last {} periods", ranked.len(), config.window);

    let assignment = assign_tiers(ranked, &config.tiers);
    if table.is_empty() {
        warn!("{}", AnalysisWarning::EmptyInput);
        warnings.push(AnalysisWarning::EmptyInput);
    } else if assignment.degenerate {
        let warning = AnalysisWarning::ZeroVolume {
            fallback_tier: config.tiers.fallback().to_string(),
        };
        warn!("{}", warning);
        warnings.push(warning);
    }

    let summary = summarize(&assignment.articles, &config.tiers);
    debug!(
        "Total volume {} across {} tiers",
        assignment.total_volume,
        summary.entries.len()
    );

    Ok(AbcAnalysis {
        articles: assignment.articles,
        summary,
        statistics,
        warnings,
        window: config.window,
    })
}
