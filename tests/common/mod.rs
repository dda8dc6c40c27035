//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tempfile::TempDir;

const JOBS: [&str; 5] = ["admin.", "blue-collar", "technician", "services", "retired"];
const MARITAL: [&str; 3] = ["married", "single", "divorced"];
const CONTACTS: [&str; 2] = ["cellular", "telephone"];
const MONTHS: [&str; 4] = ["mar", "may", "jun", "nov"];
const DAYS: [&str; 5] = ["mon", "tue", "wed", "thu", "fri"];

/// Create a small campaign table with known characteristics
///
/// - 10 rows, 6 of them converted (`y == "yes"`)
/// - `duration` of 200 seconds falls in the "3-6 min" bucket
pub fn create_small_bank_dataframe() -> DataFrame {
    df! {
        "age" => [30i64, 45, 28, 52, 39, 61, 33, 47, 25, 58],
        "job" => ["admin.", "services", "admin.", "retired", "technician", "retired", "admin.", "services", "student", "retired"],
        "marital" => ["single", "married", "single", "married", "married", "divorced", "single", "married", "single", "married"],
        "contact" => ["cellular", "telephone", "cellular", "cellular", "telephone", "cellular", "cellular", "telephone", "cellular", "cellular"],
        "month" => ["may", "may", "jun", "mar", "may", "oct", "jun", "may", "mar", "oct"],
        "day_of_week" => ["mon", "tue", "wed", "thu", "fri", "mon", "tue", "wed", "thu", "fri"],
        "duration" => [200i64, 90, 410, 700, 150, 820, 260, 60, 530, 95],
        "campaign" => [1i64, 3, 2, 1, 4, 1, 2, 5, 1, 2],
        "y" => ["yes", "no", "yes", "yes", "no", "yes", "yes", "no", "no", "yes"],
    }
    .unwrap()
}

/// Create a deterministic campaign table of `rows` rows whose outcome
/// depends on duration, age and contact channel
pub fn create_bank_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut age = Vec::with_capacity(rows);
    let mut job = Vec::with_capacity(rows);
    let mut marital = Vec::with_capacity(rows);
    let mut contact = Vec::with_capacity(rows);
    let mut month = Vec::with_capacity(rows);
    let mut day = Vec::with_capacity(rows);
    let mut duration = Vec::with_capacity(rows);
    let mut campaign = Vec::with_capacity(rows);
    let mut y = Vec::with_capacity(rows);

    for _ in 0..rows {
        let a: i64 = rng.gen_range(18..80);
        let d: i64 = rng.gen_range(10..1200);
        let c = CONTACTS[rng.gen_range(0..CONTACTS.len())];
        let mut score = d as f64 / 600.0 - 1.75;
        if c == "cellular" {
            score += 1.0;
        }
        if a > 60 {
            score += 1.0;
        }
        score += rng.gen_range(-0.8..0.8);

        age.push(a);
        job.push(JOBS[rng.gen_range(0..JOBS.len())]);
        marital.push(MARITAL[rng.gen_range(0..MARITAL.len())]);
        contact.push(c);
        month.push(MONTHS[rng.gen_range(0..MONTHS.len())]);
        day.push(DAYS[rng.gen_range(0..DAYS.len())]);
        duration.push(d);
        campaign.push(rng.gen_range(1i64..8));
        y.push(if score > 0.0 { "yes" } else { "no" });
    }

    df! {
        "age" => age,
        "job" => job,
        "marital" => marital,
        "contact" => contact,
        "month" => month,
        "day_of_week" => day,
        "duration" => duration,
        "campaign" => campaign,
        "y" => y,
    }
    .unwrap()
}

/// Write a DataFrame to a CSV file in a fresh temp directory
///
/// The TempDir must be kept alive for as long as the file is used.
pub fn create_temp_csv(df: &mut DataFrame, separator: u8) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("Bank.csv");

    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .unwrap();

    (temp_dir, path)
}

/// Assert two floats are equal within `eps`
pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "expected {} to be within {} of {}",
        actual,
        eps,
        expected
    );
}
