//! 2x2 histogram grid of the leading numeric columns

use std::path::Path;

use anyhow::Context;
use plotters::prelude::*;
use polars::prelude::DataFrame;

use super::panels::histogram_panel;
use super::ChartConfig;
use crate::pipeline::{distribution_columns, numeric_values, Histogram};

/// Draw up to four numeric columns (table order) as histograms.
///
/// Grid cells without a column stay blank. Returns the columns drawn.
pub fn render_distributions(
    df: &DataFrame,
    path: &Path,
    config: &ChartConfig,
) -> anyhow::Result<Vec<String>> {
    let columns = distribution_columns(df);

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let cells = root.split_evenly((2, 2));

    for (i, (column, cell)) in columns.iter().zip(cells.iter()).enumerate() {
        let values = numeric_values(df, column)?;
        let bins = Histogram::new(&values, config.histogram_bins);
        histogram_panel(cell, config, column, &bins, config.color(i))
            .with_context(|| format!("Failed to draw histogram for '{}'", column))?;
    }

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(columns)
}
