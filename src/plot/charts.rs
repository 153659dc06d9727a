//! SVG chart rendering via Plotters.
//!
//! Why Plotters?
//! - nicer axis + mesh rendering than anything hand-rolled
//! - the SVG backend has no window-system or font-service dependency, so the
//!   tool stays headless-safe (the charts are files, not windows)
//!
//! Two charts mirror the ASCII plots:
//! - log-log: `ln SD` vs `ln PPV` scatter + fitted line, annotated with A, B
//! - original scale: `SD` vs `PPV` scatter + fitted curve, annotated with K, alpha

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{CurveGrid, FitResult};
use crate::error::AppError;

const CHART_SIZE: (u32, u32) = (900, 600);

/// Write the log-log fit chart: `ln_sd` vs `ln_ppv` points + fitted line.
pub fn write_log_fit_svg(
    path: &Path,
    points: &[(f64, f64)],
    fit: &FitResult,
) -> Result<(), AppError> {
    let a = fit.model.intercept();
    let b = fit.model.slope();
    let caption = format!("ln(PPV) = {a:.2} + {b:.2} ln(SD)");

    // The fitted line only needs its two endpoints in log space.
    let (x0, x1) = series_x_range(points)?;
    let line = vec![(x0, a + b * x0), (x1, a + b * x1)];

    draw_chart(
        path,
        &caption,
        "ln(SD)",
        "ln(PPV)",
        points,
        &line,
    )
}

/// Write the original-scale chart: `sd` vs `ppv` points + the fitted curve grid.
pub fn write_curve_svg(
    path: &Path,
    points: &[(f64, f64)],
    grid: &CurveGrid,
    fit: &FitResult,
) -> Result<(), AppError> {
    let caption = format!(
        "PPV = {:.2} * SD^({:.2})",
        fit.model.k, fit.model.alpha
    );
    let curve: Vec<(f64, f64)> = grid
        .sd
        .iter()
        .zip(grid.ppv.iter())
        .map(|(&s, &p)| (s, p))
        .collect();

    draw_chart(
        path,
        &caption,
        "Scaled distance SD (m/kg^0.5)",
        "PPV (mm/s)",
        points,
        &curve,
    )
}

fn draw_chart(
    path: &Path,
    caption: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
    curve: &[(f64, f64)],
) -> Result<(), AppError> {
    let ((x0, x1), (y0, y1)) = chart_bounds(points, curve)?;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| chart_error(path, &e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| chart_error(path, &e))?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .draw()
        .map_err(|e| chart_error(path, &e))?;

    chart
        .draw_series(LineSeries::new(curve.iter().copied(), RED.stroke_width(2)))
        .map_err(|e| chart_error(path, &e))?
        .label("fit")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED.stroke_width(2)));

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )
        .map_err(|e| chart_error(path, &e))?
        .label("observed")
        .legend(|(x, y)| Circle::new((x + 9, y), 3, BLUE.filled()));

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(|e| chart_error(path, &e))?;

    root.present().map_err(|e| chart_error(path, &e))?;
    Ok(())
}

fn chart_error(path: &Path, e: &dyn std::fmt::Display) -> AppError {
    AppError::processing(format!("Failed to render chart '{}': {e}", path.display()))
}

fn series_x_range(points: &[(f64, f64)]) -> Result<(f64, f64), AppError> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    for &(x, _) in points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
    }
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Ok((min_x, max_x))
    } else {
        Err(AppError::processing(
            "Cannot render chart: no x-range in the series.",
        ))
    }
}

fn chart_bounds(
    points: &[(f64, f64)],
    curve: &[(f64, f64)],
) -> Result<((f64, f64), (f64, f64)), AppError> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(x, y) in points.iter().chain(curve) {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite())
        || max_x <= min_x
        || max_y <= min_y
    {
        return Err(AppError::processing(
            "Cannot render chart: degenerate axis ranges.",
        ));
    }

    let pad_x = (max_x - min_x) * 0.05;
    let pad_y = (max_y - min_y) * 0.05;
    Ok((
        (min_x - pad_x, max_x + pad_x),
        (min_y - pad_y, max_y + pad_y),
    ))
}
