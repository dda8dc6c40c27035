//! Terminal reports for the descriptive analyzer and the predictor

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use polars::prelude::DataFrame;

use crate::error::PipelineResult;
use crate::pipeline::{
    contact_analysis, conversion_analysis, demographic_analysis, ColumnDescription,
    ContactSummary, ConversionStats, DatasetOverview, DemographicSummary, EvaluationRecord,
    FeatureImportance, NumericSummary, PreparedData,
};

fn section_header(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

// Indent the table
fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn number_cell(value: f64, decimals: usize) -> Cell {
    Cell::new(format!("{:.*}", decimals, value)).set_alignment(CellAlignment::Right)
}

/// Shape, dtypes and missing values of the loaded table
pub fn display_overview(overview: &DatasetOverview) {
    section_header("📋", "DATASET OVERVIEW");
    println!(
        "      {} rows × {} columns ({:.2} MB)",
        style(overview.rows).yellow().bold(),
        style(overview.columns.len()).yellow().bold(),
        overview.memory_mb
    );
    println!();

    let mut table = new_table(&["Column", "Type", "Missing"]);
    for column in &overview.columns {
        table.add_row(vec![
            Cell::new(&column.name),
            Cell::new(&column.dtype).fg(Color::DarkGrey),
            Cell::new(column.null_count)
                .fg(if column.null_count > 0 {
                    Color::Red
                } else {
                    Color::White
                })
                .set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&table);
}

/// First rows of the table as polars formats them
pub fn display_head(df: &DataFrame, n: usize) {
    section_header("🔎", "FIRST ROWS");
    for line in df.head(Some(n)).to_string().lines() {
        println!("    {}", line);
    }
}

/// count / mean / std / quartiles per numeric column
pub fn display_numeric_description(rows: &[ColumnDescription]) {
    section_header("📐", "NUMERIC SUMMARY");
    if rows.is_empty() {
        println!("      {}", style("No numeric columns").dim());
        return;
    }

    let mut table = new_table(&["Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.count).set_alignment(CellAlignment::Right),
            number_cell(row.mean, 2),
            number_cell(row.std, 2),
            number_cell(row.min, 2),
            number_cell(row.q25, 2),
            number_cell(row.q50, 2),
            number_cell(row.q75, 2),
            number_cell(row.max, 2),
        ]);
    }
    print_indented(&table);
}

pub fn display_conversion(stats: &ConversionStats) {
    section_header("🎯", "CONVERSION ANALYSIS");

    let mut table = new_table(&["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total Records"), Cell::new(stats.total)]);
    table.add_row(vec![Cell::new("Conversions"), Cell::new(stats.conversions)]);
    table.add_row(vec![
        Cell::new("Conversion Rate"),
        Cell::new(format!("{:.2}%", stats.rate))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    print_indented(&table);
}

fn summary_rows(table: &mut Table, label: &str, summary: &NumericSummary, with_min: bool) {
    table.add_row(vec![Cell::new(format!("{} (mean)", label)), number_cell(summary.mean, 2)]);
    table.add_row(vec![Cell::new(format!("{} (median)", label)), number_cell(summary.median, 2)]);
    if with_min {
        table.add_row(vec![Cell::new(format!("{} (min)", label)), number_cell(summary.min, 0)]);
    }
    table.add_row(vec![Cell::new(format!("{} (max)", label)), number_cell(summary.max, 0)]);
}

fn counts_table(title: &str, counts: &[(String, usize)]) -> Table {
    let mut table = new_table(&[title, "Count"]);
    for (value, count) in counts {
        table.add_row(vec![
            Cell::new(value),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Age statistics and the most common jobs; absent columns are skipped
pub fn display_demographics(summary: &DemographicSummary) {
    section_header("👥", "DEMOGRAPHIC ANALYSIS");

    if let Some(age) = &summary.age {
        let mut table = new_table(&["Statistic", "Value"]);
        summary_rows(&mut table, "Age", age, true);
        print_indented(&table);
    }

    if let Some(jobs) = &summary.top_jobs {
        println!();
        print_indented(&counts_table("Top Jobs", jobs));
    }

    if summary.age.is_none() && summary.top_jobs.is_none() {
        println!("      {}", style("No demographic columns present").dim());
    }
}

/// Contact channel counts and call-duration statistics
pub fn display_contact(summary: &ContactSummary) {
    section_header("📞", "CONTACT ANALYSIS");

    if let Some(counts) = &summary.contact_counts {
        print_indented(&counts_table("Contact", counts));
    }

    if let Some(duration) = &summary.duration {
        println!();
        let mut table = new_table(&["Statistic", "Value"]);
        summary_rows(&mut table, "Duration (s)", duration, false);
        print_indented(&table);
    }

    if summary.contact_counts.is_none() && summary.duration.is_none() {
        println!("      {}", style("No contact columns present").dim());
    }
}

/// Conversion, demographic and contact sections in one pass.
///
/// A table without `y` gets a warning line instead of the conversion section.
pub fn generate_report(df: &DataFrame) -> PipelineResult<()> {
    match conversion_analysis(df)? {
        Some(stats) => display_conversion(&stats),
        None => {
            section_header("🎯", "CONVERSION ANALYSIS");
            println!("      {}", style("No 'y' column - conversion analysis skipped").yellow());
        }
    }
    display_demographics(&demographic_analysis(df)?);
    display_contact(&contact_analysis(df)?);
    Ok(())
}

/// Split sizes and class balance after preprocessing
pub fn display_split(prepared: &PreparedData) {
    let mut table = new_table(&["Split", "Rows", "Converted"]);
    table.add_row(vec![
        Cell::new("Train"),
        Cell::new(prepared.y_train.len()).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}%", prepared.train_positive_rate()))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Test"),
        Cell::new(prepared.y_test.len()).set_alignment(CellAlignment::Right),
        Cell::new(format!("{:.2}%", prepared.test_positive_rate()))
            .set_alignment(CellAlignment::Right),
    ]);
    print_indented(&table);
}

/// One row per model; the best AUC is highlighted
pub fn display_evaluation(records: &[EvaluationRecord]) {
    section_header("🏁", "MODEL EVALUATION");

    let best_auc = records
        .iter()
        .map(|r| r.auc)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut table = new_table(&["Model", "Accuracy", "Precision", "Recall", "F1", "AUC"]);
    for record in records {
        let auc_cell = if record.auc == best_auc {
            number_cell(record.auc, 4)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            number_cell(record.auc, 4)
        };
        table.add_row(vec![
            Cell::new(record.model.name()),
            number_cell(record.accuracy, 4),
            number_cell(record.precision, 4),
            number_cell(record.recall, 4),
            number_cell(record.f1, 4),
            auc_cell,
        ]);
    }
    print_indented(&table);

    println!();
    let mut confusion = new_table(&["Model", "TP", "FP", "TN", "FN"]);
    for record in records {
        let cm = &record.confusion;
        confusion.add_row(vec![
            Cell::new(record.model.name()),
            Cell::new(cm.true_positives).set_alignment(CellAlignment::Right),
            Cell::new(cm.false_positives).set_alignment(CellAlignment::Right),
            Cell::new(cm.true_negatives).set_alignment(CellAlignment::Right),
            Cell::new(cm.false_negatives).set_alignment(CellAlignment::Right),
        ]);
    }
    print_indented(&confusion);
}

pub fn display_feature_importance(features: &[FeatureImportance]) {
    section_header("🌲", "TOP FEATURES (RANDOM FOREST)");

    let mut table = new_table(&["Rank", "Feature", "Importance"]);
    for (rank, feature) in features.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1).set_alignment(CellAlignment::Right),
            Cell::new(&feature.feature),
            number_cell(feature.importance, 4),
        ]);
    }
    print_indented(&table);
}
