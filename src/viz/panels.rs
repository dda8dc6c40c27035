//! Drawing primitives shared by the chart files: one panel per function

use plotters::coord::Shift;
use plotters::data::Quartiles;
use plotters::prelude::*;

use super::ChartConfig;
use crate::pipeline::Histogram as Bins;

pub(crate) type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Category label for a segment centre; blank between segments
fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn upper_bound(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Vertical bars, one per label. Bar `i` takes `colors[i % colors.len()]`.
pub(crate) fn bar_panel(
    area: &Panel<'_>,
    config: &ChartConfig,
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    colors: &[RGBColor],
) -> anyhow::Result<()> {
    if labels.is_empty() || colors.is_empty() {
        return Ok(());
    }
    let n = labels.len() as i32;

    let mut chart = ChartBuilder::on(area)
        .caption(title, config.title_font())
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..upper_bound(values))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(labels, v))
        .y_desc(y_desc)
        .label_style(config.label_font())
        .axis_desc_style(config.label_font())
        .draw()?;

    for (i, value) in values.iter().enumerate() {
        let color = colors[i % colors.len()];
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(color.filled())
                .margin(6)
                .data(std::iter::once((i as i32, *value))),
        )?;
    }

    Ok(())
}

/// Horizontal bars, first label at the top
pub(crate) fn horizontal_bar_panel(
    area: &Panel<'_>,
    config: &ChartConfig,
    title: &str,
    x_desc: &str,
    labels: &[String],
    values: &[f64],
    color: RGBColor,
) -> anyhow::Result<()> {
    if labels.is_empty() {
        return Ok(());
    }
    // Reverse so the first entry sits on the top row
    let reversed_labels: Vec<String> = labels.iter().rev().cloned().collect();
    let n = labels.len() as i32;

    let mut chart = ChartBuilder::on(area)
        .caption(title, config.title_font())
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..upper_bound(values), (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(labels.len())
        .y_label_formatter(&|v| segment_label(&reversed_labels, v))
        .x_desc(x_desc)
        .label_style(config.label_font())
        .axis_desc_style(config.label_font())
        .draw()?;

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(color.filled())
            .margin(4)
            .data(
                values
                    .iter()
                    .rev()
                    .enumerate()
                    .map(|(i, v)| (i as i32, *v)),
            ),
    )?;

    Ok(())
}

/// One box per group; empty groups are skipped
pub(crate) fn box_panel(
    area: &Panel<'_>,
    config: &ChartConfig,
    title: &str,
    y_desc: &str,
    groups: &[(String, Vec<f64>)],
) -> anyhow::Result<()> {
    let all: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    if all.is_empty() {
        return Ok(());
    }
    let lo = all.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = all.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pad = ((hi - lo) * 0.05).max(1.0);
    let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(title, config.title_font())
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(
            (0..groups.len() as i32).into_segmented(),
            (lo - pad) as f32..(hi + pad) as f32,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len())
        .x_label_formatter(&|v| segment_label(&labels, v))
        .y_desc(y_desc)
        .label_style(config.label_font())
        .axis_desc_style(config.label_font())
        .draw()?;

    let boxes: Vec<_> = groups
        .iter()
        .enumerate()
        .filter(|(_, (_, values))| !values.is_empty())
        .map(|(i, (_, values))| {
            let quartiles = Quartiles::new(values.as_slice());
            Boxplot::new_vertical(SegmentValue::CenterOf(i as i32), &quartiles)
                .width(50)
                .whisker_width(0.5)
                .style(config.color(i))
        })
        .collect();
    chart.draw_series(boxes)?;

    Ok(())
}

/// Scatter of (x, y) points
pub(crate) fn scatter_panel(
    area: &Panel<'_>,
    config: &ChartConfig,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64)],
    color: RGBColor,
) -> anyhow::Result<()> {
    if points.is_empty() {
        return Ok(());
    }
    let x_lo = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_hi = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let x_pad = ((x_hi - x_lo) * 0.05).max(1.0);
    let y_values: Vec<f64> = points.iter().map(|p| p.1).collect();

    let mut chart = ChartBuilder::on(area)
        .caption(title, config.title_font())
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_lo - x_pad..x_hi + x_pad, 0f64..upper_bound(&y_values))?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(config.label_font())
        .axis_desc_style(config.label_font())
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 5, color.mix(0.6).filled())),
    )?;

    Ok(())
}

/// Equal-width histogram of a numeric column
pub(crate) fn histogram_panel(
    area: &Panel<'_>,
    config: &ChartConfig,
    title: &str,
    bins: &Bins,
    color: RGBColor,
) -> anyhow::Result<()> {
    let (Some(&lo), Some(&hi)) = (bins.edges.first(), bins.edges.last()) else {
        return Ok(());
    };
    let y_max = (bins.max_count().max(1) as f64 * 1.1).ceil();

    let mut chart = ChartBuilder::on(area)
        .caption(title, config.title_font())
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc(title)
        .y_desc("Frequency")
        .label_style(config.label_font())
        .axis_desc_style(config.label_font())
        .draw()?;

    chart.draw_series(bins.counts.iter().enumerate().map(|(i, &count)| {
        Rectangle::new(
            [(bins.edges[i], 0.0), (bins.edges[i + 1], count as f64)],
            color.mix(0.7).filled(),
        )
    }))?;
    chart.draw_series(bins.counts.iter().enumerate().map(|(i, &count)| {
        Rectangle::new(
            [(bins.edges[i], 0.0), (bins.edges[i + 1], count as f64)],
            BLACK.stroke_width(1),
        )
    }))?;

    Ok(())
}
