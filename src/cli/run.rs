//! Run orchestration for each subcommand

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use console::style;
use polars::prelude::DataFrame;

use super::args::{Cli, Commands};
use crate::pipeline::columns::LABEL;
use crate::pipeline::{
    conversion_analysis, describe_numeric, load_dataset_with_progress, ConversionPredictor,
    DatasetOverview, KnownColumns,
};
use crate::report::{
    display_evaluation, display_feature_importance, display_head, display_numeric_description,
    display_overview, display_split, export_run, generate_report, RunExport,
};
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success, print_warning,
    ConfigCard,
};
use crate::viz::{
    render_distributions, render_roc_curves, ConversionVisualizer, DISTRIBUTIONS_FILE, ROC_FILE,
};

const HEAD_ROWS: usize = 5;

fn require_label(df: &DataFrame, cli: &Cli, what: &str) -> Result<()> {
    if !KnownColumns::from_frame(df).has(LABEL) {
        bail!(
            "Column '{}' not found in {} - {} needs the conversion label",
            LABEL,
            cli.input.display(),
            what
        );
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Numbered steps for one run
struct Steps {
    next: u8,
}

impl Steps {
    fn start(&mut self, title: &str) -> Instant {
        self.next += 1;
        print_step_header(self.next, title);
        Instant::now()
    }
}

/// Load the input and run the selected subcommand
pub fn run(cli: &Cli) -> Result<()> {
    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input: &cli.input,
        results_dir: &cli.results_dir,
        charts_dir: &cli.charts_dir,
        test_size: cli.test_size,
        seed: cli.seed,
        n_estimators: cli.n_estimators,
    });

    let mut steps = Steps { next: 0 };

    let step_start = steps.start("Load Dataset");
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(&cli.input, &cli.load_options())?;
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    print_step_time(step_start.elapsed());

    let mut export = RunExport::new(&cli.input, &cli.predictor_config());
    export.conversion = conversion_analysis(&df)?;

    let command = cli.command();
    if matches!(command, Commands::Describe | Commands::All) {
        run_describe(cli, &df, &mut steps)?;
    }
    if matches!(command, Commands::Train | Commands::All) {
        run_train(cli, &df, &mut steps, &mut export)?;
    }
    if matches!(command, Commands::Plot | Commands::All) {
        run_plot(cli, &df, &mut steps)?;
    }

    if let Some(path) = &cli.export_json {
        export_run(&export, path)?;
        print_success(&format!("Run exported to {}", path.display()));
    }

    print_completion();
    Ok(())
}

fn run_describe(cli: &Cli, df: &DataFrame, steps: &mut Steps) -> Result<()> {
    let step_start = steps.start("Descriptive Analysis");

    display_overview(&DatasetOverview::from_frame(df));
    display_head(df, HEAD_ROWS);
    display_numeric_description(&describe_numeric(df)?);

    generate_report(df)?;

    ensure_dir(&cli.results_dir)?;
    let path = cli.results_dir.join(DISTRIBUTIONS_FILE);
    let drawn = render_distributions(df, &path, &cli.chart_config())?;
    if drawn.is_empty() {
        print_warning("No numeric columns to plot");
    } else {
        print_count("numeric columns plotted", drawn.len(), Some(drawn.join(", ").as_str()));
        print_success(&format!("Distributions saved to {}", path.display()));
    }

    print_step_time(step_start.elapsed());
    Ok(())
}

fn run_train(cli: &Cli, df: &DataFrame, steps: &mut Steps, export: &mut RunExport) -> Result<()> {
    require_label(df, cli, "training")?;
    let step_start = steps.start("Conversion Prediction");
    let mut predictor = ConversionPredictor::new(df, cli.predictor_config());

    let spinner = create_spinner("Encoding, splitting and scaling...");
    let prepared = predictor.preprocess_configured()?;
    finish_with_success(&spinner, "Preprocessing complete");
    print_count(
        "features",
        prepared.feature_names.len(),
        Some("(label and duration excluded)"),
    );
    display_split(prepared);

    predictor.train_models()?;
    let records = predictor.evaluate_models()?;
    display_evaluation(&records);

    let importance = predictor.feature_importance(cli.top_features)?;
    display_feature_importance(&importance);

    ensure_dir(&cli.results_dir)?;
    let roc_path = cli.results_dir.join(ROC_FILE);
    render_roc_curves(&predictor.roc_curves()?, &roc_path, &cli.chart_config())?;
    print_success(&format!("ROC curves saved to {}", roc_path.display()));

    export.evaluations = records;
    export.feature_importance = importance;

    print_step_time(step_start.elapsed());
    Ok(())
}

fn run_plot(cli: &Cli, df: &DataFrame, steps: &mut Steps) -> Result<()> {
    require_label(df, cli, "charting")?;
    let step_start = steps.start("Conversion Charts");
    ensure_dir(&cli.charts_dir)?;

    let visualizer = ConversionVisualizer::new(df, cli.chart_config());
    let spinner = create_spinner("Rendering charts...");
    let paths = visualizer.render_all(&cli.charts_dir)?;
    finish_with_success(&spinner, "Charts rendered");

    for path in &paths {
        print_info(&format!("Saved {}", path.display()));
    }

    print_step_time(step_start.elapsed());
    Ok(())
}
