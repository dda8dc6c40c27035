//! Grouped conversion rates for the chart panels

use std::collections::HashMap;

use polars::prelude::*;
use serde::Serialize;

use super::columns::{DAY_OF_WEEK, DURATION, MONTH};
use super::target::{column_to_string_vec, conversion_mask};
use crate::error::{PipelineError, PipelineResult};

const MONTH_ORDER: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAY_ORDER: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Conversion figures for one group of rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub group: String,
    pub total: usize,
    pub conversions: usize,
    /// Percentage of "yes" within the group
    pub rate: f64,
}

impl GroupRate {
    fn new(group: String, total: usize, conversions: usize) -> Self {
        let rate = if total == 0 {
            0.0
        } else {
            conversions as f64 / total as f64 * 100.0
        };
        Self {
            group,
            total,
            conversions,
            rate,
        }
    }
}

/// Fixed call-duration ranges, closed on the right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationBucket {
    /// (0, 180] seconds
    UpTo3Min,
    /// (180, 360] seconds
    From3To6Min,
    /// (360, 600] seconds
    From6To10Min,
    /// above 600 seconds
    Over10Min,
}

impl DurationBucket {
    pub const ALL: [DurationBucket; 4] = [
        DurationBucket::UpTo3Min,
        DurationBucket::From3To6Min,
        DurationBucket::From6To10Min,
        DurationBucket::Over10Min,
    ];

    /// Bucket for a duration in seconds; `None` for non-positive or NaN input
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        if seconds.is_nan() || seconds <= 0.0 {
            None
        } else if seconds <= 180.0 {
            Some(DurationBucket::UpTo3Min)
        } else if seconds <= 360.0 {
            Some(DurationBucket::From3To6Min)
        } else if seconds <= 600.0 {
            Some(DurationBucket::From6To10Min)
        } else {
            Some(DurationBucket::Over10Min)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationBucket::UpTo3Min => "0-3 min",
            DurationBucket::From3To6Min => "3-6 min",
            DurationBucket::From6To10Min => "6-10 min",
            DurationBucket::Over10Min => "10+ min",
        }
    }
}

impl std::fmt::Display for DurationBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sort key for group labels of a given column
#[derive(Debug, Clone, PartialEq, PartialOrd)]
enum GroupKey {
    Calendar(usize),
    Number(f64),
    Text(String),
}

fn group_key(column: &str, numeric: bool, value: &str) -> GroupKey {
    let calendar = match column {
        MONTH => MONTH_ORDER.iter().position(|m| m.eq_ignore_ascii_case(value)),
        DAY_OF_WEEK => DAY_ORDER.iter().position(|d| d.eq_ignore_ascii_case(value)),
        _ => None,
    };
    if let Some(idx) = calendar {
        return GroupKey::Calendar(idx);
    }
    if numeric {
        if let Ok(n) = value.parse::<f64>() {
            return GroupKey::Number(n);
        }
    }
    GroupKey::Text(value.to_string())
}

/// Per-group conversion rate for `column`.
///
/// Rows with a null group value are left out. Groups are ordered by key:
/// numeric columns numerically, `month`/`day_of_week` in calendar order,
/// everything else lexicographically.
pub fn conversion_rate_by(df: &DataFrame, column: &str) -> PipelineResult<Vec<GroupRate>> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::missing_column(column))?;
    let numeric = col.dtype().is_primitive_numeric();
    let keys = column_to_string_vec(col)?;
    let mask = conversion_mask(df)?;

    let mut tallies: HashMap<String, (usize, usize)> = HashMap::new();
    for (key, &converted) in keys.into_iter().zip(mask.iter()) {
        if let Some(key) = key {
            let entry = tallies.entry(key).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += converted as usize;
        }
    }

    let mut rates: Vec<GroupRate> = tallies
        .into_iter()
        .map(|(group, (total, conversions))| GroupRate::new(group, total, conversions))
        .collect();
    rates.sort_by(|a, b| {
        group_key(column, numeric, &a.group)
            .partial_cmp(&group_key(column, numeric, &b.group))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(rates)
}

/// Conversion rate per duration bucket, in bucket order; empty buckets omitted
pub fn conversion_rate_by_duration(df: &DataFrame) -> PipelineResult<Vec<GroupRate>> {
    let col = df
        .column(DURATION)
        .map_err(|_| PipelineError::missing_column(DURATION))?;
    let seconds = col.cast(&DataType::Float64)?;
    let mask = conversion_mask(df)?;

    let mut tallies = [(0usize, 0usize); 4];
    for (value, &converted) in seconds.f64()?.into_iter().zip(mask.iter()) {
        if let Some(bucket) = value.and_then(DurationBucket::from_seconds) {
            let slot = &mut tallies[bucket as usize];
            slot.0 += 1;
            slot.1 += converted as usize;
        }
    }

    Ok(DurationBucket::ALL
        .iter()
        .zip(tallies.iter())
        .filter(|(_, (total, _))| *total > 0)
        .map(|(bucket, &(total, conversions))| {
            GroupRate::new(bucket.label().to_string(), total, conversions)
        })
        .collect())
}

/// Highest-rate groups first; equal rates keep their key order
pub fn top_by_rate(mut rates: Vec<GroupRate>, n: usize) -> Vec<GroupRate> {
    rates.sort_by(|a, b| b.rate.partial_cmp(&a.rate).unwrap_or(std::cmp::Ordering::Equal));
    rates.truncate(n);
    rates
}

/// Non-null values of `column` split by outcome: `(not_converted, converted)`
pub fn values_by_outcome(df: &DataFrame, column: &str) -> PipelineResult<(Vec<f64>, Vec<f64>)> {
    let col = df
        .column(column)
        .map_err(|_| PipelineError::missing_column(column))?;
    let values = col.cast(&DataType::Float64)?;
    let mask = conversion_mask(df)?;

    let mut no = Vec::new();
    let mut yes = Vec::new();
    for (value, &converted) in values.f64()?.into_iter().zip(mask.iter()) {
        if let Some(v) = value {
            if converted == 1 {
                yes.push(v);
            } else {
                no.push(v);
            }
        }
    }
    Ok((no, yes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_bucket_boundaries() {
        assert_eq!(DurationBucket::from_seconds(200.0), Some(DurationBucket::From3To6Min));
        assert_eq!(DurationBucket::from_seconds(180.0), Some(DurationBucket::UpTo3Min));
        assert_eq!(DurationBucket::from_seconds(360.0), Some(DurationBucket::From3To6Min));
        assert_eq!(DurationBucket::from_seconds(600.0), Some(DurationBucket::From6To10Min));
        assert_eq!(DurationBucket::from_seconds(4000.0), Some(DurationBucket::Over10Min));
        assert_eq!(DurationBucket::from_seconds(0.0), None);
        assert_eq!(DurationBucket::From3To6Min.to_string(), "3-6 min");
    }

    #[test]
    fn test_rate_by_numeric_group_sorted_numerically() {
        let df = df! {
            "campaign" => [10i64, 2, 2, 1, 10],
            "y" => ["yes", "no", "yes", "no", "no"],
        }
        .unwrap();

        let rates = conversion_rate_by(&df, "campaign").unwrap();
        let groups: Vec<&str> = rates.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["1", "2", "10"]);
        assert_eq!(rates[1].total, 2);
        assert_eq!(rates[1].conversions, 1);
        assert!((rates[1].rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_calendar_order_for_days() {
        let df = df! {
            "day_of_week" => ["fri", "mon", "thu", "tue", "wed"],
            "y" => ["no", "yes", "no", "no", "no"],
        }
        .unwrap();

        let rates = conversion_rate_by(&df, "day_of_week").unwrap();
        let groups: Vec<&str> = rates.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["mon", "tue", "wed", "thu", "fri"]);
    }

    #[test]
    fn test_duration_rates() {
        let df = df! {
            "duration" => [100i64, 200, 250, 700, 0],
            "y" => ["no", "yes", "no", "yes", "yes"],
        }
        .unwrap();

        let rates = conversion_rate_by_duration(&df).unwrap();
        let groups: Vec<&str> = rates.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["0-3 min", "3-6 min", "10+ min"]);
        assert!((rates[1].rate - 50.0).abs() < 1e-9);
        assert!((rates[2].rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_by_rate() {
        let rates = vec![
            GroupRate::new("a".into(), 10, 1),
            GroupRate::new("b".into(), 10, 5),
            GroupRate::new("c".into(), 10, 3),
        ];
        let top = top_by_rate(rates, 2);
        assert_eq!(top[0].group, "b");
        assert_eq!(top[1].group, "c");
    }

    #[test]
    fn test_values_by_outcome() {
        let df = df! {
            "age" => [Some(30i64), Some(40), None, Some(50)],
            "y" => ["no", "yes", "yes", "no"],
        }
        .unwrap();
        let (no, yes) = values_by_outcome(&df, "age").unwrap();
        assert_eq!(no, vec![30.0, 50.0]);
        assert_eq!(yes, vec![40.0]);
    }
}
