//! Command-line interface definitions and argument parsing

use crate::config::{
    AnalysisConfig, ColumnLayout, TierScheme, DEFAULT_PERIOD_COUNT, DEFAULT_PERIOD_PREFIX,
};
use crate::data::CsvDialect;
use clap::Parser;

/// ABC inventory analysis: rank articles by recent movements and assign A/B/C tiers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "data/input_data.csv")]
    pub input: String,

    /// Directory for the results file
    #[arg(short, long, default_value = "output")]
    pub output_dir: String,

    /// Number of trailing periods summed into the ranking metric
    #[arg(short, long, default_value = "6")]
    pub window: usize,

    /// Cumulative percentage up to which articles are tier A
    #[arg(short = 'a', long, default_value = "80")]
    pub threshold_a: f64,

    /// Cumulative percentage up to which articles are tier B
    #[arg(short = 'b', long, default_value = "95")]
    pub threshold_b: f64,

    /// Custom tier table, overrides the A/B thresholds
    /// Example: --tiers "A:70,B:90,C:97,D" (the last tier takes the remainder)
    #[arg(long)]
    pub tiers: Option<String>,

    /// Prefix of the period column names
    #[arg(long, default_value = DEFAULT_PERIOD_PREFIX)]
    pub period_prefix: String,

    /// Number of period columns, numbered from 1
    #[arg(short, long, default_value_t = DEFAULT_PERIOD_COUNT)]
    pub periods: usize,

    /// Name of the identifier column
    #[arg(long, default_value = "id")]
    pub id_column: String,

    /// Name of the article number column
    #[arg(long, default_value = "number")]
    pub number_column: String,

    /// Name of the article name column
    #[arg(long, default_value = "name")]
    pub name_column: String,

    /// Field separator of the input file
    #[arg(short, long, default_value = ";")]
    pub separator: char,

    /// Number of top-ranked articles to list
    #[arg(short, long, default_value = "5")]
    pub top: usize,

    /// Skip writing the results file
    #[arg(long)]
    pub no_save: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Tier scheme from `--tiers`, or the A/B/C scheme from the two thresholds
    pub fn tier_scheme(&self) -> crate::Result<TierScheme> {
        let scheme = match self.tiers {
            Some(ref definition) => TierScheme::parse(definition)?,
            None => TierScheme::abc(self.threshold_a, self.threshold_b)?,
        };
        Ok(scheme)
    }

    pub fn column_layout(&self) -> ColumnLayout {
        ColumnLayout {
            id: self.id_column.clone(),
            number: self.number_column.clone(),
            name: self.name_column.clone(),
            ..ColumnLayout::with_period_prefix(&self.period_prefix, self.periods)
        }
    }

    /// Validated analysis configuration
    pub fn analysis_config(&self) -> crate::Result<AnalysisConfig> {
        let config = AnalysisConfig {
            window: self.window,
            tiers: self.tier_scheme()?,
            columns: self.column_layout(),
        };
        config.validate_window(self.periods)?;
        Ok(config)
    }

    pub fn dialect(&self) -> crate::Result<CsvDialect> {
        if !self.separator.is_ascii() {
            anyhow::bail!("Separator must be a single ASCII character, got '{}'", self.separator);
        }
        Ok(CsvDialect {
            separator: self.separator as u8,
            ..CsvDialect::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("abcforge").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.input, "data/input_data.csv");
        assert_eq!(args.output_dir, "output");

        let config = args.analysis_config().unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(args.dialect().unwrap(), CsvDialect::default());
    }

    #[test]
    fn test_tier_scheme_from_thresholds() {
        let args = parse(&["-a", "70", "-b", "90"]);
        let scheme = args.tier_scheme().unwrap();
        assert_eq!(scheme.classify(70.0), "A");
        assert_eq!(scheme.classify(85.0), "B");
        assert_eq!(scheme.classify(91.0), "C");

        let args = parse(&["-a", "95", "-b", "80"]);
        assert!(args.tier_scheme().is_err());
    }

    #[test]
    fn test_custom_tiers_override_thresholds() {
        let args = parse(&["--tiers", "A:50,B:75,C:90,D", "-a", "10"]);
        let scheme = args.tier_scheme().unwrap();
        assert_eq!(scheme.labels().collect::<Vec<_>>(), vec!["A", "B", "C", "D"]);
        assert_eq!(scheme.classify(40.0), "A");
    }

    #[test]
    fn test_column_layout_and_window() {
        let args = parse(&["--period-prefix", "P", "--periods", "4", "-w", "4", "--id-column", "sku"]);
        let config = args.analysis_config().unwrap();
        assert_eq!(config.columns.id, "sku");
        assert_eq!(config.columns.periods, vec!["P1", "P2", "P3", "P4"]);

        let args = parse(&["--periods", "4", "-w", "5"]);
        assert!(args.analysis_config().is_err());
    }

    #[test]
    fn test_separator() {
        let args = parse(&["-s", ","]);
        assert_eq!(args.dialect().unwrap().separator, b',');

        let args = parse(&["-s", "§"]);
        assert!(args.dialect().is_err());
    }
}
