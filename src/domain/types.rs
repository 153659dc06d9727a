//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mapping from spreadsheet column headers to the three canonical fields
/// (plus an optional blast-date passthrough).
///
/// The defaults match the Portuguese labels of the original monitoring
/// spreadsheet (`Apendice II`), but every header is overridable on the CLI —
/// the mapping is configuration, not a hardcoded literal.
///
/// Matching is case-insensitive and ignores a UTF-8 BOM and surrounding
/// whitespace, so `ppv (mm/s)` and `PPV (mm/s)` resolve the same column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Header of the peak-particle-velocity column (mm/s).
    pub ppv: String,
    /// Header of the monitor-to-blast distance column (m).
    pub distance: String,
    /// Header of the maximum-charge-per-delay column (kg).
    pub charge: String,
    /// Optional header of a blast-date column (carried through to exports).
    pub date: Option<String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            ppv: "PPV (mm/s)".to_string(),
            distance: "Distancia (m)".to_string(),
            charge: "Carga Maxima por Espera (kg)".to_string(),
            date: None,
        }
    }
}

/// Resolved configuration for one `blast fit` run.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,
    pub columns: ColumnMap,
    /// Number of evenly spaced SD points on the fitted curve grid.
    pub curve_points: usize,
    /// Rows shown in the above/below-model residual tables.
    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    /// Optional CSV export of the derived per-record table.
    pub export_records: Option<PathBuf>,
    /// Optional JSON export of the fitted curve.
    pub export_curve: Option<PathBuf>,
    /// Optional SVG chart of the log-log fit.
    pub svg_log: Option<PathBuf>,
    /// Optional SVG chart of the original-scale fit.
    pub svg_curve: Option<PathBuf>,
}

/// One cleaned monitoring observation.
///
/// Invariant (enforced by ingest): `ppv`, `distance`, and `charge` are all
/// finite and strictly positive. Rows violating this never leave the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlastRecord {
    /// 1-based line number in the source CSV (headers are line 1).
    pub line: usize,
    /// Peak particle velocity (mm/s).
    pub ppv: f64,
    /// Monitor-to-blast distance (m).
    pub distance: f64,
    /// Maximum explosive charge weight per delay (kg).
    pub charge: f64,
    /// Blast date, when the input provides one.
    pub date: Option<NaiveDate>,
}

/// A `BlastRecord` extended with its derived quantities.
///
/// Computed once by the transform step and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledRecord {
    pub record: BlastRecord,
    /// Scaled distance: `distance / sqrt(charge)`.
    pub sd: f64,
    pub ln_ppv: f64,
    pub ln_sd: f64,
}

/// The fitted attenuation law `PPV = K · SD^alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttenuationModel {
    pub k: f64,
    pub alpha: f64,
}

impl AttenuationModel {
    /// Intercept `A = ln K` of the linearized model.
    pub fn intercept(&self) -> f64 {
        self.k.ln()
    }

    /// Slope `B = alpha` of the linearized model.
    pub fn slope(&self) -> f64 {
        self.alpha
    }

    /// Predicted PPV at a scaled distance.
    pub fn predict(&self, sd: f64) -> f64 {
        self.k * sd.powf(self.alpha)
    }

    /// Predicted `ln PPV` at a log scaled distance.
    pub fn predict_ln(&self, ln_sd: f64) -> f64 {
        self.intercept() + self.alpha * ln_sd
    }
}

/// Goodness-of-fit metrics, all in log space (where the regression runs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub n: usize,
}

/// Full result of one regression: model, quality, and the 2×2 parameter
/// covariance of `(A, B)` (row/column order: intercept, slope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: AttenuationModel,
    pub quality: FitQuality,
    pub covariance: [[f64; 2]; 2],
}

impl FitResult {
    /// Standard error of the intercept `A`.
    pub fn stderr_intercept(&self) -> f64 {
        self.covariance[0][0].max(0.0).sqrt()
    }

    /// Standard error of the slope `alpha`.
    pub fn stderr_slope(&self) -> f64 {
        self.covariance[1][1].max(0.0).sqrt()
    }
}

/// A fitted curve evaluated on an evenly spaced SD grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub sd: Vec<f64>,
    pub ppv: Vec<f64>,
}

/// Portable representation of a fitted attenuation curve.
///
/// This is what `--export-curve` writes and `blast plot` reads back: the
/// model parameters plus a precomputed grid, so replotting never needs the
/// original measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub model: AttenuationModel,
    pub quality: FitQuality,
    pub grid: CurveGrid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_back_transform_roundtrip() {
        let model = AttenuationModel { k: 120.0, alpha: -1.6 };
        assert!((model.intercept() - 120.0_f64.ln()).abs() < 1e-12);
        // predict and predict_ln agree through exp().
        let sd = 14.2;
        assert!((model.predict(sd).ln() - model.predict_ln(sd.ln())).abs() < 1e-12);
    }

    #[test]
    fn default_column_map_keeps_original_labels() {
        let map = ColumnMap::default();
        assert_eq!(map.ppv, "PPV (mm/s)");
        assert_eq!(map.distance, "Distancia (m)");
        assert_eq!(map.charge, "Carga Maxima por Espera (kg)");
        assert!(map.date.is_none());
    }
}
