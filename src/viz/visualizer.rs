//! Conversion-rate chart sets written to the charts directory

use std::path::{Path, PathBuf};

use anyhow::Context;
use plotters::prelude::*;
use polars::prelude::DataFrame;

use super::panels::{bar_panel, box_panel, horizontal_bar_panel, scatter_panel, Panel};
use super::{
    ChartConfig, CONTACT_FILE, CONVERSION_DISTRIBUTION_FILE, DEMOGRAPHIC_FILE, TEMPORAL_FILE,
};
use crate::error::PipelineError;
use crate::pipeline::columns::{
    KnownColumns, AGE, CAMPAIGN, CONTACT, DAY_OF_WEEK, DURATION, EDUCATION, JOB, LABEL, MARITAL,
    MONTH, PDAYS, QUARTER,
};
use crate::pipeline::{
    conversion_mask, conversion_rate_by, conversion_rate_by_duration, top_by_rate,
    values_by_outcome, GroupRate,
};

const RATE_AXIS: &str = "Conversion Rate (%)";
const TOP_JOBS_CHARTED: usize = 10;
const CAMPAIGN_GROUPS_CHARTED: usize = 10;

fn labels_and_rates(rates: &[GroupRate]) -> (Vec<String>, Vec<f64>) {
    rates.iter().map(|r| (r.group.clone(), r.rate)).unzip()
}

/// Renders the four conversion chart sets for one table
pub struct ConversionVisualizer {
    df: DataFrame,
    known: KnownColumns,
    config: ChartConfig,
}

impl ConversionVisualizer {
    pub fn new(df: &DataFrame, config: ChartConfig) -> Self {
        Self {
            known: KnownColumns::from_frame(df),
            df: df.clone(),
            config,
        }
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    fn require_label(&self) -> Result<(), PipelineError> {
        if self.known.has(LABEL) {
            Ok(())
        } else {
            Err(PipelineError::missing_column(LABEL))
        }
    }

    /// Grouped rates for a column, or `None` when the table lacks it
    pub fn rates_for(&self, column: &str) -> anyhow::Result<Option<Vec<GroupRate>>> {
        if !self.known.has(column) {
            return Ok(None);
        }
        Ok(Some(conversion_rate_by(&self.df, column)?))
    }

    fn rate_panel(
        &self,
        area: &Panel<'_>,
        column: &str,
        title: &str,
        color_idx: usize,
    ) -> anyhow::Result<()> {
        if let Some(rates) = self.rates_for(column)? {
            let (labels, values) = labels_and_rates(&rates);
            let color = self.config.color(color_idx);
            bar_panel(area, &self.config, title, RATE_AXIS, &labels, &values, &[color])
                .with_context(|| format!("Failed to draw '{}' panel", column))?;
        }
        Ok(())
    }

    fn canvas<'a>(&self, path: &'a Path) -> anyhow::Result<Panel<'a>> {
        let root = BitMapBackend::new(path, (self.config.width, self.config.height))
            .into_drawing_area();
        root.fill(&WHITE)?;
        Ok(root)
    }

    /// Share and counts of converted vs not converted
    pub fn plot_conversion_distribution(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        self.require_label()?;
        let path = dir.join(CONVERSION_DISTRIBUTION_FILE);
        let mask = conversion_mask(&self.df)?;
        let converted = mask.iter().filter(|&&v| v == 1).count();
        let not_converted = mask.len() - converted;
        let total = mask.len().max(1) as f64;

        // Drawing areas borrow `path` until the end of this block
        {
            let root = self.canvas(&path)?;
            let halves = root.split_evenly((1, 2));
            let labels = vec!["Not Converted".to_string(), "Converted".to_string()];
            let colors = [self.config.not_converted_color, self.config.converted_color];

            let share = vec![
                not_converted as f64 / total * 100.0,
                converted as f64 / total * 100.0,
            ];
            let counts = vec![not_converted as f64, converted as f64];

            bar_panel(
                &halves[0],
                &self.config,
                "Overall Conversion Distribution",
                "Share (%)",
                &labels,
                &share,
                &colors,
            )?;
            bar_panel(
                &halves[1],
                &self.config,
                "Conversion Counts",
                "Count",
                &labels,
                &counts,
                &colors,
            )?;

            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(path)
    }

    /// Age by outcome, top jobs, marital status and education
    pub fn plot_demographic_analysis(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        self.require_label()?;
        let path = dir.join(DEMOGRAPHIC_FILE);
        // Drawing areas borrow `path` until the end of this block
        {
            let root = self.canvas(&path)?;
            let cells = root.split_evenly((2, 2));

            if self.known.has(AGE) {
                let (no, yes) = values_by_outcome(&self.df, AGE)?;
                box_panel(
                    &cells[0],
                    &self.config,
                    "Age Distribution by Conversion",
                    "Age",
                    &[("No".to_string(), no), ("Yes".to_string(), yes)],
                )?;
            }

            if let Some(rates) = self.rates_for(JOB)? {
                let (labels, values) = labels_and_rates(&top_by_rate(rates, TOP_JOBS_CHARTED));
                horizontal_bar_panel(
                    &cells[1],
                    &self.config,
                    "Conversion Rate by Job Type",
                    RATE_AXIS,
                    &labels,
                    &values,
                    self.config.color(0),
                )?;
            }

            self.rate_panel(&cells[2], MARITAL, "Conversion Rate by Marital Status", 1)?;
            self.rate_panel(&cells[3], EDUCATION, "Conversion Rate by Education", 2)?;

            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(path)
    }

    /// Contact type, call duration, days since previous contact and campaign attempts
    pub fn plot_contact_analysis(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        self.require_label()?;
        let path = dir.join(CONTACT_FILE);
        // Drawing areas borrow `path` until the end of this block
        {
            let root = self.canvas(&path)?;
            let cells = root.split_evenly((2, 2));

            self.rate_panel(&cells[0], CONTACT, "Conversion Rate by Contact Type", 3)?;

            if self.known.has(DURATION) {
                let (labels, values) = labels_and_rates(&conversion_rate_by_duration(&self.df)?);
                bar_panel(
                    &cells[1],
                    &self.config,
                    "Conversion Rate by Call Duration",
                    RATE_AXIS,
                    &labels,
                    &values,
                    &[self.config.color(4)],
                )?;
            }

            if let Some(rates) = self.rates_for(PDAYS)? {
                let points: Vec<(f64, f64)> = rates
                    .iter()
                    .filter_map(|r| r.group.parse::<f64>().ok().map(|days| (days, r.rate)))
                    .collect();
                scatter_panel(
                    &cells[2],
                    &self.config,
                    "Conversion Rate vs Days Since Previous Contact",
                    "Days",
                    RATE_AXIS,
                    &points,
                    self.config.color(0),
                )?;
            }

            if let Some(mut rates) = self.rates_for(CAMPAIGN)? {
                rates.truncate(CAMPAIGN_GROUPS_CHARTED);
                let (labels, values) = labels_and_rates(&rates);
                bar_panel(
                    &cells[3],
                    &self.config,
                    "Conversion Rate by Campaign Attempts",
                    RATE_AXIS,
                    &labels,
                    &values,
                    &[self.config.color(5)],
                )?;
            }

            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(path)
    }

    /// Month, day of week and (when present) quarter
    pub fn plot_temporal_analysis(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        self.require_label()?;
        let path = dir.join(TEMPORAL_FILE);
        // Drawing areas borrow `path` until the end of this block
        {
            let root = self.canvas(&path)?;
            let cells = root.split_evenly((2, 2));

            self.rate_panel(&cells[0], MONTH, "Conversion Rate by Month", 6)?;
            self.rate_panel(&cells[1], DAY_OF_WEEK, "Conversion Rate by Day of Week", 7)?;
            self.rate_panel(&cells[2], QUARTER, "Conversion Rate by Quarter", 8)?;

            root.present()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(path)
    }

    /// All four chart sets, in a fixed order
    pub fn render_all(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        Ok(vec![
            self.plot_conversion_distribution(dir)?,
            self.plot_demographic_analysis(dir)?,
            self.plot_contact_analysis(dir)?,
            self.plot_temporal_analysis(dir)?,
        ])
    }
}
