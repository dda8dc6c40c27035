//! ROC curves of the trained models on one chart

use std::path::Path;

use anyhow::Context;
use plotters::prelude::*;

use super::ChartConfig;
use crate::pipeline::ModelRoc;

pub fn render_roc_curves(
    curves: &[ModelRoc],
    path: &Path,
    config: &ChartConfig,
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("ROC Curves (test split)", config.title_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)?;

    chart
        .configure_mesh()
        .x_desc("False Positive Rate")
        .y_desc("True Positive Rate")
        .label_style(config.label_font())
        .axis_desc_style(config.label_font())
        .draw()?;

    // Chance line
    chart.draw_series(LineSeries::new(
        vec![(0.0, 0.0), (1.0, 1.0)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;

    for (i, curve) in curves.iter().enumerate() {
        let color = config.color(i);
        chart
            .draw_series(LineSeries::new(
                curve
                    .points
                    .iter()
                    .map(|p| (p.false_positive_rate, p.true_positive_rate)),
                color.stroke_width(3),
            ))?
            .label(format!("{} (AUC = {:.3})", curve.model, curve.auc))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(config.label_font())
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
