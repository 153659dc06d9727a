//! Reporting utilities: residuals, outlier ranking, and formatted output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, ScaledRecord};
use crate::error::AppError;

/// One record with its fitted value and log-space residual.
#[derive(Debug, Clone)]
pub struct ResidualRecord {
    pub scaled: ScaledRecord,
    /// Model prediction in log space, `A + B · ln_sd`.
    pub ln_fit: f64,
    /// Model prediction back-transformed to mm/s.
    pub ppv_fit: f64,
    /// `ln_ppv − ln_fit`; positive means the blast shook more than predicted.
    pub residual: f64,
}

/// Records most above/below the fitted model (top-N each side).
#[derive(Debug, Clone)]
pub struct Outliers {
    pub above: Vec<ResidualRecord>,
    pub below: Vec<ResidualRecord>,
}

/// Compute fitted values and residuals for each record.
pub fn compute_residuals(
    records: &[ScaledRecord],
    fit: &FitResult,
) -> Result<Vec<ResidualRecord>, AppError> {
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        let ln_fit = fit.model.predict_ln(r.ln_sd);
        if !ln_fit.is_finite() {
            return Err(AppError::processing(
                "Non-finite model prediction during residual computation.",
            ));
        }
        out.push(ResidualRecord {
            scaled: r.clone(),
            ln_fit,
            ppv_fit: ln_fit.exp(),
            residual: r.ln_ppv - ln_fit,
        });
    }
    Ok(out)
}

/// Rank the records most above and most below the model.
pub fn rank_outliers(residuals: &[ResidualRecord], top_n: usize) -> Outliers {
    let mut above = residuals.to_vec();
    above.sort_by(|a, b| {
        b.residual
            .partial_cmp(&a.residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    above.truncate(top_n);

    let mut below = residuals.to_vec();
    below.sort_by(|a, b| {
        a.residual
            .partial_cmp(&b.residual)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    below.truncate(top_n);

    Outliers { above, below }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttenuationModel, BlastRecord, FitQuality};
    use crate::fit::derive_record;

    fn scaled(line: usize, ppv: f64, distance: f64, charge: f64) -> ScaledRecord {
        derive_record(&BlastRecord {
            line,
            ppv,
            distance,
            charge,
            date: None,
        })
        .unwrap()
    }

    fn fit(k: f64, alpha: f64) -> FitResult {
        FitResult {
            model: AttenuationModel { k, alpha },
            quality: FitQuality { sse: 0.0, rmse: 0.0, r2: 1.0, n: 2 },
            covariance: [[0.0; 2]; 2],
        }
    }

    #[test]
    fn residuals_vanish_on_the_model_itself() {
        // PPV = 100 · SD^-1: SD=10 -> 10, SD=20 -> 5.
        let records = vec![scaled(2, 10.0, 50.0, 25.0), scaled(3, 5.0, 100.0, 25.0)];
        let residuals = compute_residuals(&records, &fit(100.0, -1.0)).unwrap();

        assert_eq!(residuals.len(), 2);
        for r in &residuals {
            assert!(r.residual.abs() < 1e-12);
            assert!((r.ppv_fit - r.scaled.record.ppv).abs() < 1e-9);
        }
    }

    #[test]
    fn rank_outliers_splits_above_and_below() {
        // Same SD spread, but the middle record shakes twice the model.
        let records = vec![
            scaled(2, 10.0, 50.0, 25.0),
            scaled(3, 14.14, 70.7, 25.0),
            scaled(4, 2.5, 100.0, 25.0),
        ];
        let residuals = compute_residuals(&records, &fit(100.0, -1.0)).unwrap();
        let outliers = rank_outliers(&residuals, 1);

        assert_eq!(outliers.above.len(), 1);
        assert_eq!(outliers.above[0].scaled.record.line, 3);
        assert_eq!(outliers.below.len(), 1);
        assert_eq!(outliers.below[0].scaled.record.line, 4);
    }
}
