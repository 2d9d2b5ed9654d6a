//! Per-period descriptive statistics over all articles

use crate::model::ArticleTable;
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Mean, sample standard deviation, min and max of one period column.
///
/// Absent values are skipped. A value is NaN when it is undefined for the
/// present values: every statistic for an all-absent period, and the standard
/// deviation when fewer than two values are present.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodStatistics {
    pub period: String,
    /// Number of present values
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Period counts as an (articles × periods) matrix, NaN marking absent cells
pub fn count_matrix(table: &ArticleTable) -> Array2<f64> {
    let records = table.records();
    Array2::from_shape_fn((records.len(), table.period_count()), |(row, period)| {
        records[row].count(period).unwrap_or(f64::NAN)
    })
}

/// Statistics for every period column, in column order
pub fn period_statistics(table: &ArticleTable) -> Vec<PeriodStatistics> {
    let matrix = count_matrix(table);
    table
        .period_names()
        .iter()
        .zip(matrix.axis_iter(Axis(1)))
        .map(|(period, column)| describe(period, column))
        .collect()
}

fn describe(period: &str, column: ArrayView1<f64>) -> PeriodStatistics {
    let present: Array1<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    let count = present.len();

    if count == 0 {
        return PeriodStatistics {
            period: period.to_string(),
            count,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        };
    }

    let mean = present.mean().unwrap_or(f64::NAN);
    let std = if count > 1 { present.std(1.0) } else { f64::NAN };
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    PeriodStatistics {
        period: period.to_string(),
        count,
        mean,
        std,
        min,
        max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArticleRecord;

    fn table() -> ArticleTable {
        let records = vec![
            ArticleRecord::new("1", "10", "Screw", vec![Some(2.0), None, None]),
            ArticleRecord::new("2", "20", "Washer", vec![Some(4.0), Some(7.0), None]),
            ArticleRecord::new("3", "30", "Dowel", vec![Some(6.0), None, None]),
        ];
        let names = vec!["Month_1".to_string(), "Month_2".to_string(), "Month_3".to_string()];
        ArticleTable::new(names, records).unwrap()
    }

    #[test]
    fn test_statistics_over_present_values() {
        let stats = period_statistics(&table());
        assert_eq!(stats.len(), 3);

        let first = &stats[0];
        assert_eq!(first.period, "Month_1");
        assert_eq!(first.count, 3);
        assert!((first.mean - 4.0).abs() < 1e-12);
        assert!((first.std - 2.0).abs() < 1e-12);
        assert_eq!(first.min, 2.0);
        assert_eq!(first.max, 6.0);
    }

    #[test]
    fn test_single_value_has_undefined_std() {
        let stats = period_statistics(&table());
        let second = &stats[1];
        assert_eq!(second.count, 1);
        assert_eq!(second.mean, 7.0);
        assert!(second.std.is_nan());
        assert_eq!(second.min, 7.0);
        assert_eq!(second.max, 7.0);
    }

    #[test]
    fn test_all_absent_period_is_nan_not_zero() {
        let stats = period_statistics(&table());
        let third = &stats[2];
        assert_eq!(third.count, 0);
        assert!(third.mean.is_nan());
        assert!(third.std.is_nan());
        assert!(third.min.is_nan());
        assert!(third.max.is_nan());
    }

    #[test]
    fn test_count_matrix_shape() {
        let matrix = count_matrix(&table());
        assert_eq!(matrix.shape(), &[3, 3]);
        assert!(matrix[[0, 1]].is_nan());
        assert_eq!(matrix[[1, 1]], 7.0);
    }
}
