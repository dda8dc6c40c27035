//! Integration tests for the descriptive reports and conversion-rate grouping

mod common;

use bankconv::pipeline::{
    contact_analysis, conversion_analysis, conversion_rate_by, conversion_rate_by_duration,
    demographic_analysis, describe_numeric, distribution_columns, top_by_rate, values_by_outcome,
    DurationBucket,
};
use bankconv::PipelineError;
use common::{assert_close, create_small_bank_dataframe};
use polars::prelude::*;

#[test]
fn test_conversion_rate_of_small_table() {
    let df = create_small_bank_dataframe();
    let stats = conversion_analysis(&df).unwrap().unwrap();

    assert_eq!(stats.total, 10);
    assert_eq!(stats.conversions, 6);
    assert_close(stats.rate, 60.0, 1e-9);
}

#[test]
fn test_label_match_is_exact() {
    let df = df! {
        "y" => ["yes", "Yes", "YES", " yes", "no"],
    }
    .unwrap();

    let stats = conversion_analysis(&df).unwrap().unwrap();
    assert_eq!(stats.conversions, 1);
    assert_close(stats.rate, 20.0, 1e-9);
}

#[test]
fn test_reports_skip_absent_columns() {
    let df = df! {
        "balance" => [100i64, 200, 300],
        "job" => ["admin.", "admin.", "services"],
    }
    .unwrap();

    assert!(conversion_analysis(&df).unwrap().is_none());

    let demographics = demographic_analysis(&df).unwrap();
    assert!(demographics.age.is_none());
    let jobs = demographics.top_jobs.unwrap();
    assert_eq!(jobs[0], ("admin.".to_string(), 2));

    let contact = contact_analysis(&df).unwrap();
    assert!(contact.contact_counts.is_none());
    assert!(contact.duration.is_none());
}

#[test]
fn test_similarly_named_column_is_not_present() {
    let df = df! {
        "age_group" => [1i64, 2, 3],
    }
    .unwrap();

    assert!(demographic_analysis(&df).unwrap().age.is_none());
}

#[test]
fn test_top_jobs_limited_to_five() {
    let df = df! {
        "job" => ["a", "a", "a", "b", "b", "c", "d", "e", "f", "g"],
    }
    .unwrap();

    let jobs = demographic_analysis(&df).unwrap().top_jobs.unwrap();
    assert_eq!(jobs.len(), 5);
    assert_eq!(jobs[0], ("a".to_string(), 3));
    assert_eq!(jobs[1], ("b".to_string(), 2));
}

#[test]
fn test_contact_and_duration_summary() {
    let df = create_small_bank_dataframe();
    let contact = contact_analysis(&df).unwrap();

    let counts = contact.contact_counts.unwrap();
    assert_eq!(counts[0], ("cellular".to_string(), 7));
    assert_eq!(counts[1], ("telephone".to_string(), 3));

    let duration = contact.duration.unwrap();
    assert_close(duration.min, 60.0, 1e-9);
    assert_close(duration.max, 820.0, 1e-9);
}

#[test]
fn test_describe_numeric_columns_in_order() {
    let df = create_small_bank_dataframe();
    let rows = describe_numeric(&df).unwrap();

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["age", "duration", "campaign"]);

    let campaign = &rows[2];
    assert_eq!(campaign.count, 10);
    assert_close(campaign.mean, 2.2, 1e-9);
    assert_close(campaign.min, 1.0, 1e-9);
    assert_close(campaign.max, 5.0, 1e-9);
    assert!(campaign.q25 <= campaign.q50 && campaign.q50 <= campaign.q75);
}

#[test]
fn test_distribution_columns_capped_at_four() {
    let df = df! {
        "a" => [1i64, 2],
        "label" => ["x", "y"],
        "b" => [1.0f64, 2.0],
        "c" => [3i64, 4],
        "d" => [5i64, 6],
        "e" => [7i64, 8],
    }
    .unwrap();

    assert_eq!(distribution_columns(&df), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_duration_bucket_boundaries() {
    assert_eq!(DurationBucket::from_seconds(200.0), Some(DurationBucket::From3To6Min));
    assert_eq!(DurationBucket::from_seconds(180.0), Some(DurationBucket::UpTo3Min));
    assert_eq!(DurationBucket::from_seconds(0.0), None);
    assert_eq!(DurationBucket::from_seconds(-5.0), None);
    assert_eq!(DurationBucket::from_seconds(200.0).unwrap().label(), "3-6 min");
}

#[test]
fn test_rate_by_duration_bucket() {
    let df = df! {
        "duration" => [200i64, 250, 100, 0],
        "y" => ["yes", "no", "no", "yes"],
    }
    .unwrap();

    let rates = conversion_rate_by_duration(&df).unwrap();
    let groups: Vec<&str> = rates.iter().map(|r| r.group.as_str()).collect();
    assert_eq!(groups, vec!["0-3 min", "3-6 min"]);

    let mid = &rates[1];
    assert_eq!(mid.total, 2);
    assert_eq!(mid.conversions, 1);
    assert_close(mid.rate, 50.0, 1e-9);
}

#[test]
fn test_rate_by_month_in_calendar_order() {
    let df = create_small_bank_dataframe();
    let rates = conversion_rate_by(&df, "month").unwrap();

    let groups: Vec<&str> = rates.iter().map(|r| r.group.as_str()).collect();
    assert_eq!(groups, vec!["mar", "may", "jun", "oct"]);

    let total: usize = rates.iter().map(|r| r.total).sum();
    assert_eq!(total, 10);
}

#[test]
fn test_rate_by_requires_label() {
    let df = df! {
        "job" => ["admin."],
    }
    .unwrap();

    let err = conversion_rate_by(&df, "job").unwrap_err();
    assert!(matches!(err, PipelineError::MissingColumn { ref column } if column == "y"));
}

#[test]
fn test_top_jobs_by_rate() {
    let df = create_small_bank_dataframe();
    let top = top_by_rate(conversion_rate_by(&df, "job").unwrap(), 2);

    assert_eq!(top.len(), 2);
    assert!(top[0].rate >= top[1].rate);
    assert_close(top[0].rate, 100.0, 1e-9);
}

#[test]
fn test_values_split_by_outcome() {
    let df = create_small_bank_dataframe();
    let (not_converted, converted) = values_by_outcome(&df, "age").unwrap();

    assert_eq!(converted.len(), 6);
    assert_eq!(not_converted.len(), 4);
    assert!(converted.contains(&61.0));
    assert!(not_converted.contains(&45.0));
}
