//! Chart rendering to PNG with plotters
//!
//! All sizing, fonts and colours come from a [`ChartConfig`] handed to the
//! renderer; nothing is global.

mod panels;

pub mod distributions;
pub mod roc;
pub mod visualizer;

use plotters::style::RGBColor;

pub use distributions::render_distributions;
pub use roc::render_roc_curves;
pub use visualizer::ConversionVisualizer;

pub const DISTRIBUTIONS_FILE: &str = "distributions.png";
pub const ROC_FILE: &str = "roc_curves.png";
pub const CONVERSION_DISTRIBUTION_FILE: &str = "conversion_distribution.png";
pub const DEMOGRAPHIC_FILE: &str = "demographic_analysis.png";
pub const CONTACT_FILE: &str = "contact_analysis.png";
pub const TEMPORAL_FILE: &str = "temporal_analysis.png";

#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub title_size: u32,
    pub label_size: u32,
    /// Bins per distribution histogram
    pub histogram_bins: usize,
    pub not_converted_color: RGBColor,
    pub converted_color: RGBColor,
    /// Cycled through for per-panel and per-series colours
    pub palette: Vec<RGBColor>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            font_family: "sans-serif".to_string(),
            title_size: 22,
            label_size: 14,
            histogram_bins: 50,
            not_converted_color: RGBColor(0x2e, 0xcc, 0x71),
            converted_color: RGBColor(0xe7, 0x4c, 0x3c),
            palette: vec![
                RGBColor(70, 130, 180),  // steelblue
                RGBColor(255, 127, 80),  // coral
                RGBColor(144, 238, 144), // lightgreen
                RGBColor(135, 206, 235), // skyblue
                RGBColor(240, 128, 128), // lightcoral
                RGBColor(147, 112, 219), // mediumpurple
                RGBColor(255, 215, 0),   // gold
                RGBColor(32, 178, 170),  // lightseagreen
                RGBColor(255, 99, 71),   // tomato
            ],
        }
    }
}

impl ChartConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub(crate) fn title_font(&self) -> (&str, u32) {
        (self.font_family.as_str(), self.title_size)
    }

    pub(crate) fn label_font(&self) -> (&str, u32) {
        (self.font_family.as_str(), self.label_size)
    }

    /// Palette entry `i`, wrapping around
    pub fn color(&self, i: usize) -> RGBColor {
        if self.palette.is_empty() {
            RGBColor(70, 130, 180)
        } else {
            self.palette[i % self.palette.len()]
        }
    }
}
