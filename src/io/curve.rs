//! Read/write curve JSON files and evaluate the fitted grid.
//!
//! Curve JSON is the "portable" representation of a fitted attenuation law:
//! - model parameters (K, alpha)
//! - fit quality
//! - a precomputed `PPV = K · SD^alpha` grid for quick replotting
//!
//! The schema is defined by `domain::CurveFile`. Exposing the grid as plain
//! data is also what lets headless runs and tests assert on curve values
//! without any display.

use std::fs::File;
use std::path::Path;

use crate::domain::{AttenuationModel, CurveFile, CurveGrid, FitResult};
use crate::error::AppError;

/// Evaluate the model on `n` evenly spaced SD points spanning `[sd_min, sd_max]`.
pub fn build_grid(model: &AttenuationModel, sd_min: f64, sd_max: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let mut s0 = sd_min;
    let mut s1 = sd_max;
    if !(s0.is_finite() && s1.is_finite()) || s1 < s0 {
        s0 = 1.0;
        s1 = 100.0;
    }
    if (s1 - s0).abs() < 1e-9 {
        // Degenerate span: widen symmetrically so the grid is still usable.
        s0 = (s0 * 0.5).max(1e-6);
        s1 = s1 * 1.5;
    }

    let mut sd = Vec::with_capacity(n);
    let mut ppv = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let s = s0 + u * (s1 - s0);
        sd.push(s);
        ppv.push(model.predict(s));
    }

    CurveGrid { sd, ppv }
}

/// Write a curve JSON file.
pub fn write_curve_json(
    path: &Path,
    fit: &FitResult,
    grid: &CurveGrid,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::processing(format!(
            "Failed to create curve JSON '{}': {e}",
            path.display()
        ))
    })?;

    let curve = CurveFile {
        tool: "blast".to_string(),
        model: fit.model,
        quality: fit.quality,
        grid: grid.clone(),
    };

    serde_json::to_writer_pretty(file, &curve)
        .map_err(|e| AppError::processing(format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::missing_file(format!(
            "Failed to open curve JSON '{}': {e}",
            path.display()
        ))
    })?;
    let curve: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::processing(format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}
