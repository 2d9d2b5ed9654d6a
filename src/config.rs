//! Analysis configuration: window size, tier scheme and input column layout

use crate::error::AbcError;
use std::collections::HashSet;

/// Default number of trailing periods summed into the ranking metric
pub const DEFAULT_WINDOW: usize = 6;
/// Default cumulative-percentage bound for tier A
pub const DEFAULT_THRESHOLD_A: f64 = 80.0;
/// Default cumulative-percentage bound for tier B
pub const DEFAULT_THRESHOLD_B: f64 = 95.0;
/// Default number of period columns
pub const DEFAULT_PERIOD_COUNT: usize = 13;
/// Default prefix of period column names (`Month_1` .. `Month_13`)
pub const DEFAULT_PERIOD_PREFIX: &str = "Month_";

/// A bounded tier: articles whose cumulative percentage is `<= upper_bound` get `label`
#[derive(Debug, Clone, PartialEq)]
pub struct TierRule {
    pub label: String,
    pub upper_bound: f64,
}

/// Ordered tier table, evaluated first match wins, with a catch-all fallback tier
#[derive(Debug, Clone, PartialEq)]
pub struct TierScheme {
    rules: Vec<TierRule>,
    fallback: String,
}

impl TierScheme {
    /// Build and validate a scheme from `(label, upper_bound)` pairs and a fallback label
    pub fn new(rules: Vec<TierRule>, fallback: impl Into<String>) -> Result<Self, AbcError> {
        let fallback = fallback.into();
        let scheme = Self { rules, fallback };
        scheme.validate()?;
        Ok(scheme)
    }

    /// Classic A/B/C scheme: `<= t_a` is A, `<= t_b` is B, the rest is C
    pub fn abc(t_a: f64, t_b: f64) -> Result<Self, AbcError> {
        Self::new(
            vec![
                TierRule {
                    label: "A".to_string(),
                    upper_bound: t_a,
                },
                TierRule {
                    label: "B".to_string(),
                    upper_bound: t_b,
                },
            ],
            "C",
        )
    }

    /// Parse a scheme such as `"A:80,B:95,C"`; the last entry has no bound and is the fallback
    pub fn parse(definition: &str) -> Result<Self, AbcError> {
        let parts: Vec<&str> = definition.split(',').map(str::trim).collect();
        let Some((fallback, bounded)) = parts.split_last() else {
            return Err(AbcError::InvalidTierScheme("empty tier list".to_string()));
        };
        if fallback.contains(':') {
            return Err(AbcError::InvalidTierScheme(format!(
                "last tier '{}' must not carry a threshold",
                fallback
            )));
        }

        let mut rules = Vec::with_capacity(bounded.len());
        for part in bounded {
            let (label, bound) = part.split_once(':').ok_or_else(|| {
                AbcError::InvalidTierScheme(format!("expected 'LABEL:PERCENT', got '{}'", part))
            })?;
            let upper_bound: f64 = bound.trim().parse().map_err(|_| {
                AbcError::InvalidTierScheme(format!("invalid threshold '{}' for tier '{}'", bound, label))
            })?;
            rules.push(TierRule {
                label: label.trim().to_string(),
                upper_bound,
            });
        }

        Self::new(rules, *fallback)
    }

    fn validate(&self) -> Result<(), AbcError> {
        if self.rules.is_empty() {
            return Err(AbcError::InvalidTierScheme(
                "at least one bounded tier is required".to_string(),
            ));
        }

        let mut previous = 0.0;
        for rule in &self.rules {
            if !rule.upper_bound.is_finite() || rule.upper_bound <= previous {
                return Err(AbcError::InvalidTierScheme(format!(
                    "threshold {} for tier '{}' must be greater than {}",
                    rule.upper_bound, rule.label, previous
                )));
            }
            previous = rule.upper_bound;
        }
        if previous > 100.0 {
            return Err(AbcError::InvalidTierScheme(format!(
                "highest threshold {} exceeds 100",
                previous
            )));
        }

        let mut seen = HashSet::new();
        for label in self.labels() {
            if label.is_empty() {
                return Err(AbcError::InvalidTierScheme("tier labels must not be empty".to_string()));
            }
            if !seen.insert(label) {
                return Err(AbcError::InvalidTierScheme(format!("duplicate tier label '{}'", label)));
            }
        }

        Ok(())
    }

    /// Tier for a cumulative percentage; inclusive `<=` comparisons
    pub fn classify(&self, cumulative_percentage: f64) -> &str {
        self.rules
            .iter()
            .find(|rule| cumulative_percentage <= rule.upper_bound)
            .map(|rule| rule.label.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    pub fn rules(&self) -> &[TierRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// All labels in evaluation order, fallback last
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .map(|rule| rule.label.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
    }
}

impl Default for TierScheme {
    fn default() -> Self {
        Self {
            rules: vec![
                TierRule {
                    label: "A".to_string(),
                    upper_bound: DEFAULT_THRESHOLD_A,
                },
                TierRule {
                    label: "B".to_string(),
                    upper_bound: DEFAULT_THRESHOLD_B,
                },
            ],
            fallback: "C".to_string(),
        }
    }
}

/// Names of the input columns
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub id: String,
    pub number: String,
    pub name: String,
    /// Period columns in chronological order, oldest first
    pub periods: Vec<String>,
}

impl ColumnLayout {
    /// Period columns named `{prefix}1` .. `{prefix}{count}`
    pub fn with_period_prefix(prefix: &str, count: usize) -> Self {
        Self {
            periods: (1..=count).map(|i| format!("{}{}", prefix, i)).collect(),
            ..Self::default()
        }
    }

    pub fn required(&self) -> [&str; 3] {
        [self.id.as_str(), self.number.as_str(), self.name.as_str()]
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            number: "number".to_string(),
            name: "name".to_string(),
            periods: (1..=DEFAULT_PERIOD_COUNT)
                .map(|i| format!("{}{}", DEFAULT_PERIOD_PREFIX, i))
                .collect(),
        }
    }
}

/// Everything the classifier needs besides the table itself
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Number of trailing periods summed into the ranking metric
    pub window: usize,
    pub tiers: TierScheme,
    pub columns: ColumnLayout,
}

impl AnalysisConfig {
    /// Check the window against the number of periods actually loaded
    pub fn validate_window(&self, periods: usize) -> Result<(), AbcError> {
        if self.window == 0 || self.window > periods {
            return Err(AbcError::InvalidWindow {
                window: self.window,
                periods,
            });
        }
        Ok(())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            tiers: TierScheme::default(),
            columns: ColumnLayout::default(),
        }
    }
}
