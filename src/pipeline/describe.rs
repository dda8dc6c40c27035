//! Descriptive statistics over the loaded campaign table

use std::collections::HashMap;

use polars::prelude::*;
use serde::Serialize;

use super::columns::{KnownColumns, AGE, CONTACT, DURATION, JOB, LABEL};
use super::target::{column_to_string_vec, conversion_mask};
use crate::error::{PipelineError, PipelineResult};

/// Number of job categories shown in the demographic summary
pub const TOP_JOBS: usize = 5;

/// Number of numeric columns drawn in the distribution grid
pub const DISTRIBUTION_COLUMNS: usize = 4;

/// Overall conversion figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionStats {
    pub total: usize,
    pub conversions: usize,
    /// Percentage in [0, 100]
    pub rate: f64,
}

/// Location and range of a numeric column (nulls ignored)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DemographicSummary {
    pub age: Option<NumericSummary>,
    /// Most frequent job categories, most common first
    pub top_jobs: Option<Vec<(String, usize)>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactSummary {
    pub contact_counts: Option<Vec<(String, usize)>>,
    /// Call duration in seconds
    pub duration: Option<NumericSummary>,
}

/// `describe()`-style row for one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// Equal-width histogram over the non-null values of a column
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width buckets spanning [min, max].
    ///
    /// The last bucket is closed on the right. A constant column is spread
    /// over [v - 0.5, v + 0.5].
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self {
                edges: (0..=bins).map(|i| i as f64 / bins as f64).collect(),
                counts: vec![0; bins],
            };
        }

        let (mut lo, mut hi) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Non-null values of a column as f64
pub fn numeric_values(df: &DataFrame, column: &str) -> PipelineResult<Vec<f64>> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::missing_column(column))?;
    let cast = col.cast(&DataType::Float64)?;
    let values = cast.f64()?.into_iter().flatten().collect();
    Ok(values)
}

/// Linear-interpolated quantile of an ascending slice
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Mean, median, min and max; `None` when there are no values
pub fn summarize(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(NumericSummary {
        count: sorted.len(),
        mean,
        median: quantile_sorted(&sorted, 0.5),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

/// Frequency of each distinct non-null value, most frequent first.
///
/// Equal counts are ordered by value so the output is stable.
pub fn value_counts(df: &DataFrame, column: &str) -> PipelineResult<Vec<(String, usize)>> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::missing_column(column))?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in column_to_string_vec(col)?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(sorted)
}

/// Share of `"yes"` outcomes. `None` when the table has no label column.
pub fn conversion_analysis(df: &DataFrame) -> PipelineResult<Option<ConversionStats>> {
    let known = KnownColumns::from_frame(df);
    if !known.has(LABEL) {
        return Ok(None);
    }

    let mask = conversion_mask(df)?;
    let total = mask.len();
    let conversions = mask.iter().filter(|&&v| v == 1).count();
    let rate = if total == 0 {
        0.0
    } else {
        conversions as f64 / total as f64 * 100.0
    };

    Ok(Some(ConversionStats {
        total,
        conversions,
        rate,
    }))
}

/// Age statistics and the most common jobs, each only if its column exists
pub fn demographic_analysis(df: &DataFrame) -> PipelineResult<DemographicSummary> {
    let known = KnownColumns::from_frame(df);
    let mut summary = DemographicSummary::default();

    if known.has_numeric(AGE) {
        summary.age = summarize(&numeric_values(df, AGE)?);
    }

    if known.has(JOB) {
        let mut jobs = value_counts(df, JOB)?;
        jobs.truncate(TOP_JOBS);
        summary.top_jobs = Some(jobs);
    }

    Ok(summary)
}

/// Contact channel frequencies and call duration statistics
pub fn contact_analysis(df: &DataFrame) -> PipelineResult<ContactSummary> {
    let known = KnownColumns::from_frame(df);
    let mut summary = ContactSummary::default();

    if known.has(CONTACT) {
        summary.contact_counts = Some(value_counts(df, CONTACT)?);
    }

    if known.has_numeric(DURATION) {
        summary.duration = summarize(&numeric_values(df, DURATION)?);
    }

    Ok(summary)
}

/// Count, mean, sample std and quartiles for every numeric column
pub fn describe_numeric(df: &DataFrame) -> PipelineResult<Vec<ColumnDescription>> {
    let known = KnownColumns::from_frame(df);
    let mut rows = Vec::new();

    for name in known.numeric_in_order() {
        let sorted = sorted_copy(&numeric_values(df, name)?);
        let count = sorted.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            sorted.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        rows.push(ColumnDescription {
            name: name.to_string(),
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&sorted, 0.25),
            q50: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        });
    }

    Ok(rows)
}

/// Up to the first four numeric columns, in table order
pub fn distribution_columns(df: &DataFrame) -> Vec<String> {
    KnownColumns::from_frame(df)
        .numeric_in_order()
        .into_iter()
        .take(DISTRIBUTION_COLUMNS)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_rate_sixty_percent() {
        let df = df! {
            "y" => ["yes", "yes", "no", "yes", "no", "yes", "no", "yes", "no", "yes"],
        }
        .unwrap();

        let stats = conversion_analysis(&df).unwrap().unwrap();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.conversions, 6);
        assert!((stats.rate - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_conversion_absent_label() {
        let df = df! { "age" => [30i64] }.unwrap();
        assert!(conversion_analysis(&df).unwrap().is_none());
    }

    #[test]
    fn test_summarize_even_count_median() {
        let summary = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.mean, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_value_counts_ties_by_name() {
        let df = df! {
            "job" => ["b", "a", "c", "a", "b", "d"],
        }
        .unwrap();

        let counts = value_counts(&df, "job").unwrap();
        assert_eq!(
            counts,
            vec![
                ("a".to_string(), 2),
                ("b".to_string(), 2),
                ("c".to_string(), 1),
                ("d".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_demographics_skip_absent_columns() {
        let df = df! { "job" => ["admin.", "admin.", "services"] }.unwrap();
        let summary = demographic_analysis(&df).unwrap();
        assert!(summary.age.is_none());
        assert_eq!(summary.top_jobs.unwrap()[0], ("admin.".to_string(), 2));
    }

    #[test]
    fn test_describe_quartiles() {
        let df = df! { "x" => [1.0f64, 2.0, 3.0, 4.0, 5.0] }.unwrap();
        let rows = describe_numeric(&df).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.q25, 2.0);
        assert_eq!(row.q50, 3.0);
        assert_eq!(row.q75, 4.0);
        assert!((row.std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_edges_and_counts() {
        let hist = Histogram::new(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(hist.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(hist.counts, vec![2, 3]);
        assert_eq!(hist.max_count(), 3);

        let constant = Histogram::new(&[7.0, 7.0], 4);
        assert_eq!(constant.counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_distribution_columns_first_four_numeric() {
        let df = df! {
            "a" => [1i64], "job" => ["x"], "b" => [1.0f64], "c" => [2i64],
            "d" => [3i64], "e" => [4i64],
        }
        .unwrap();
        assert_eq!(distribution_columns(&df), vec!["a", "b", "c", "d"]);
    }
}
