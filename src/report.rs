//! Console report and results file for a finished analysis

use crate::model::{AbcAnalysis, ClassifiedArticle, TierSummary};
use crate::stats::PeriodStatistics;
use anyhow::Context;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the per-article results inside the output directory
pub const RESULTS_FILE: &str = "abc_analysis_results.csv";

/// Render a statistic, keeping undefined values visible as `NaN`
fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Print per-period mean, std, min and max
pub fn print_period_statistics(statistics: &[PeriodStatistics]) {
    println!("\n=== Statistical Analysis of Period Movements ===");
    println!("  {:<12} | {:>10} | {:>10} | {:>10} | {:>10}", "Period", "Mean", "Std", "Min", "Max");
    println!("  {:-<12}-|-{:->10}-|-{:->10}-|-{:->10}-|-{:->10}", "", "", "", "", "");
    for stat in statistics {
        println!(
            "  {:<12} | {:>10} | {:>10} | {:>10} | {:>10}",
            stat.period,
            format_stat(stat.mean),
            format_stat(stat.std),
            format_stat(stat.min),
            format_stat(stat.max)
        );
    }
}

/// Print every classified article in rank order
pub fn print_results(articles: &[ClassifiedArticle<'_>], window: usize) {
    println!("\n=== ABC Analysis Results ===");
    println!(
        "  {:>5} | {:<10} | {:<12} | {:<30} | {:>12} | {:>8} | Tier",
        "Rank",
        "ID",
        "Number",
        "Name",
        format!("Last {}", window),
        "Cum. %"
    );
    for article in articles {
        let record = article.record();
        let cumulative = article
            .cumulative_percentage
            .map_or_else(|| "-".to_string(), |p| format!("{:.2}", p));
        println!(
            "  {:>5} | {:<10} | {:<12} | {:<30} | {:>12} | {:>8} | {}",
            article.rank_position() + 1,
            record.id,
            record.number,
            record.name,
            article.window_sum(),
            cumulative,
            article.tier
        );
    }
}

/// Summary lines, one per observed tier
pub fn summary_lines(summary: &TierSummary) -> Vec<String> {
    summary
        .entries
        .iter()
        .map(|entry| {
            let volume_share = entry
                .percent_volume
                .map_or_else(|| "n/a".to_string(), |p| format!("{:.2}%", p));
            format!(
                "Tier {}: {} articles ({:.2}%), total movements: {} ({})",
                entry.tier, entry.article_count, entry.percent_articles, entry.volume, volume_share
            )
        })
        .collect()
}

pub fn print_tier_summary(summary: &TierSummary) {
    println!("\n=== Summary of ABC Tiers ===");
    println!("Total articles: {}", summary.total_articles);
    println!("Total movements: {}", summary.total_volume);
    for line in summary_lines(summary) {
        println!("  {}", line);
    }
}

/// Print the highest-ranked articles
pub fn print_top_articles(analysis: &AbcAnalysis<'_>, n: usize) {
    let top = analysis.top(n);
    if top.is_empty() {
        return;
    }
    println!("\nTop {} articles:", top.len());
    for article in top {
        println!(
            "  {}. {} ({}) - {} movements, tier {}",
            article.rank_position() + 1,
            article.record().name,
            article.record().number,
            article.window_sum(),
            article.tier
        );
    }
}

/// Build the results table: id, number, name, window sum, cumulative percentage, tier
pub fn results_frame(analysis: &AbcAnalysis<'_>) -> PolarsResult<DataFrame> {
    let articles = &analysis.articles;
    let window_column = format!("last_{}_periods", analysis.window);

    df!(
        "id" => articles.iter().map(|a| a.record().id.clone()).collect::<Vec<_>>(),
        "number" => articles.iter().map(|a| a.record().number.clone()).collect::<Vec<_>>(),
        "name" => articles.iter().map(|a| a.record().name.clone()).collect::<Vec<_>>(),
        window_column.as_str() => articles.iter().map(|a| a.window_sum()).collect::<Vec<_>>(),
        "cumulative_percentage" => articles.iter().map(|a| a.cumulative_percentage).collect::<Vec<_>>(),
        "abc_category" => articles.iter().map(|a| a.tier.clone()).collect::<Vec<_>>()
    )
}

/// Write the results table into `output_dir`, creating the directory if needed
///
/// # Returns
/// * Path of the written file
pub fn save_results(analysis: &AbcAnalysis<'_>, output_dir: impl AsRef<Path>) -> crate::Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
        info!("Output directory '{}' created", output_dir.display());
    }

    let output_path = output_dir.join(RESULTS_FILE);
    let mut frame = results_frame(analysis)?;
    let mut file = File::create(&output_path)
        .with_context(|| format!("failed to create {}", output_path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)
        .with_context(|| format!("error saving the results file {}", output_path.display()))?;

    info!("Results saved to '{}'", output_path.display());
    Ok(output_path)
}

/// Print the full console report
pub fn print_report(analysis: &AbcAnalysis<'_>, top: usize) {
    print_period_statistics(&analysis.statistics);
    print_results(&analysis.articles, analysis.window);
    print_tier_summary(&analysis.summary);
    print_top_articles(analysis, top);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::model::{run_analysis, ArticleRecord, ArticleTable};
    use tempfile::tempdir;

    fn create_test_table() -> ArticleTable {
        let records = [50.0, 30.0, 15.0, 4.0, 1.0]
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                ArticleRecord::new(
                    format!("{}", i + 1),
                    format!("{}", 1000 + i),
                    format!("Article {}", i + 1),
                    vec![None, Some(count)],
                )
            })
            .collect();
        ArticleTable::new(vec!["Month_1".to_string(), "Month_2".to_string()], records).unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            window: 1,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_summary_lines() {
        let table = create_test_table();
        let analysis = run_analysis(&table, &config()).unwrap();
        let lines = summary_lines(&analysis.summary);
        assert_eq!(
            lines,
            vec![
                "Tier A: 2 articles (40.00%), total movements: 80 (80.00%)",
                "Tier B: 1 articles (20.00%), total movements: 15 (15.00%)",
                "Tier C: 2 articles (40.00%), total movements: 5 (5.00%)",
            ]
        );
    }

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(f64::NAN), "NaN");
        assert_eq!(format_stat(2.5), "2.50");
    }

    #[test]
    fn test_results_frame() {
        let table = create_test_table();
        let analysis = run_analysis(&table, &config()).unwrap();
        let frame = results_frame(&analysis).unwrap();
        assert_eq!(frame.shape(), (5, 6));
        let names: Vec<String> = frame.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec!["id", "number", "name", "last_1_periods", "cumulative_percentage", "abc_category"]
        );
    }

    #[test]
    fn test_save_results_creates_directory() {
        let table = create_test_table();
        let analysis = run_analysis(&table, &config()).unwrap();
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("output");

        let path = save_results(&analysis, &output_dir).unwrap();
        assert!(output_dir.is_dir());
        assert_eq!(path, output_dir.join(RESULTS_FILE));

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("id,number,name,last_1_periods,cumulative_percentage,abc_category")
        );
        assert_eq!(content.lines().count(), 6);
        assert!(content.lines().nth(1).unwrap().starts_with("1,1000,Article 1,"));
    }

    #[test]
    fn test_print_report_handles_empty_analysis() {
        let table = ArticleTable::new(vec!["Month_1".to_string()], Vec::new()).unwrap();
        let analysis = run_analysis(&table, &config()).unwrap();
        print_report(&analysis, 5);
        assert!(summary_lines(&analysis.summary).is_empty());
    }
}
