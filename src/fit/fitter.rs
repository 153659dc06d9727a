//! The attenuation regression.
//!
//! Given derived records `(ln_SD_i, ln_PPV_i)` we solve the OLS problem
//!
//! ```text
//! ln_PPV_i ≈ A + B · ln_SD_i
//! ```
//!
//! and back-transform `K = e^A`, `alpha = B`. The model is linear in its
//! parameters after the log transform, so there is no iterative search —
//! one SVD solve is the whole calibration.
//!
//! Underdetermined inputs are rejected explicitly:
//! - fewer than 2 records, or
//! - fewer than 2 distinct scaled distances (a vertical stack of points
//!   cannot pin down a slope; the SVD would otherwise return an arbitrary
//!   minimum-norm answer).

use nalgebra::{DMatrix, DVector};

use crate::domain::{AttenuationModel, FitQuality, FitResult, ScaledRecord};
use crate::error::AppError;
use crate::math::solve_least_squares;

/// Minimum spread (in ln SD) below which the slope is unidentifiable.
const MIN_LN_SD_SPREAD: f64 = 1e-9;

/// Fit `PPV = K · SD^alpha` to the derived records.
pub fn fit_attenuation(records: &[ScaledRecord]) -> Result<FitResult, AppError> {
    let n = records.len();
    if n < 2 {
        return Err(AppError::underdetermined(format!(
            "Need at least 2 valid observations to fit the attenuation law (got {n})."
        )));
    }

    let ln_sd: Vec<f64> = records.iter().map(|r| r.ln_sd).collect();
    let ln_ppv: Vec<f64> = records.iter().map(|r| r.ln_ppv).collect();

    let spread = ln_sd.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
        - ln_sd.iter().cloned().fold(f64::INFINITY, f64::min);
    if !spread.is_finite() || spread < MIN_LN_SD_SPREAD {
        return Err(AppError::underdetermined(
            "All observations share the same scaled distance; the slope is unidentifiable.",
        ));
    }

    // Design matrix [1, ln SD].
    let mut x = DMatrix::zeros(n, 2);
    for (i, &v) in ln_sd.iter().enumerate() {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = v;
    }
    let y = DVector::from_column_slice(&ln_ppv);

    let beta = solve_least_squares(&x, &y).ok_or_else(|| {
        AppError::processing("Least-squares solve failed (design matrix too ill-conditioned).")
    })?;

    let a = beta[0];
    let b = beta[1];
    if !(a.is_finite() && b.is_finite()) {
        return Err(AppError::processing(
            "Regression produced non-finite coefficients.",
        ));
    }

    let quality = compute_quality(&ln_sd, &ln_ppv, a, b);
    let covariance = compute_covariance(&x, quality.sse, n);

    Ok(FitResult {
        model: AttenuationModel { k: a.exp(), alpha: b },
        quality,
        covariance,
    })
}

fn compute_quality(ln_sd: &[f64], ln_ppv: &[f64], a: f64, b: f64) -> FitQuality {
    let n = ln_ppv.len();
    let mean_y = ln_ppv.iter().sum::<f64>() / n as f64;

    let mut sse = 0.0;
    let mut sst = 0.0;
    for (&x, &y) in ln_sd.iter().zip(ln_ppv) {
        let resid = y - (a + b * x);
        sse += resid * resid;
        sst += (y - mean_y) * (y - mean_y);
    }

    let rmse = (sse / n as f64).sqrt();
    // Constant y makes SST zero; a perfect fit of a constant is R² = 1.
    let r2 = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };

    FitQuality { sse, rmse, r2, n }
}

/// Parameter covariance `σ² (XᵀX)⁻¹` with `σ² = SSE / (n − 2)`.
///
/// With exactly 2 points the residual variance is undefined (0/0), so we
/// report a zero matrix rather than NaNs.
fn compute_covariance(x: &DMatrix<f64>, sse: f64, n: usize) -> [[f64; 2]; 2] {
    if n <= 2 {
        return [[0.0; 2]; 2];
    }

    let xtx = x.transpose() * x;
    let Some(inv) = xtx.try_inverse() else {
        return [[0.0; 2]; 2];
    };

    let sigma2 = sse / (n - 2) as f64;
    [
        [sigma2 * inv[(0, 0)], sigma2 * inv[(0, 1)]],
        [sigma2 * inv[(1, 0)], sigma2 * inv[(1, 1)]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlastRecord;
    use crate::error::ErrorKind;
    use crate::fit::scale::derive_records;

    fn records_from_law(k: f64, alpha: f64, sds: &[f64]) -> Vec<ScaledRecord> {
        // Build records whose (distance, charge) reproduce the requested SD
        // exactly (charge = 1 so sd = distance).
        let records: Vec<BlastRecord> = sds
            .iter()
            .enumerate()
            .map(|(i, &sd)| BlastRecord {
                line: i + 2,
                ppv: k * sd.powf(alpha),
                distance: sd,
                charge: 1.0,
                date: None,
            })
            .collect();
        derive_records(&records).unwrap()
    }

    #[test]
    fn recovers_exact_parameters_from_noiseless_data() {
        let k0 = 487.3;
        let alpha0 = -1.62;
        let scaled = records_from_law(k0, alpha0, &[5.0, 8.0, 12.5, 20.0, 31.0, 44.0]);

        let fit = fit_attenuation(&scaled).unwrap();
        assert!((fit.model.k - k0).abs() < 1e-6 * k0);
        assert!((fit.model.alpha - alpha0).abs() < 1e-6);
        assert!(fit.quality.sse < 1e-12);
        assert!((fit.quality.r2 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn two_point_fit_reproduces_the_implied_line() {
        // (PPV=10, D=50, Q=25) -> SD=10; (PPV=5, D=100, Q=25) -> SD=20.
        let records = vec![
            BlastRecord { line: 2, ppv: 10.0, distance: 50.0, charge: 25.0, date: None },
            BlastRecord { line: 3, ppv: 5.0, distance: 100.0, charge: 25.0, date: None },
        ];
        let scaled = derive_records(&records).unwrap();
        let fit = fit_attenuation(&scaled).unwrap();

        // Halving PPV per doubling of SD means alpha = -1 exactly and
        // K = PPV · SD = 100.
        assert!((fit.model.alpha + 1.0).abs() < 1e-9);
        assert!((fit.model.k - 100.0).abs() < 1e-6);
        // n = 2 leaves no residual degrees of freedom.
        assert_eq!(fit.covariance, [[0.0; 2]; 2]);
    }

    #[test]
    fn fewer_than_two_points_is_underdetermined() {
        let scaled = records_from_law(100.0, -1.5, &[10.0]);
        let err = fit_attenuation(&scaled).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnderdeterminedFit);

        let err = fit_attenuation(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnderdeterminedFit);
    }

    #[test]
    fn identical_scaled_distances_are_underdetermined() {
        let records = vec![
            BlastRecord { line: 2, ppv: 10.0, distance: 50.0, charge: 25.0, date: None },
            BlastRecord { line: 3, ppv: 12.0, distance: 50.0, charge: 25.0, date: None },
            BlastRecord { line: 4, ppv: 9.0, distance: 50.0, charge: 25.0, date: None },
        ];
        let scaled = derive_records(&records).unwrap();
        let err = fit_attenuation(&scaled).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnderdeterminedFit);
    }

    #[test]
    fn covariance_shrinks_with_sample_size() {
        // Same law, mild deterministic perturbation, more points -> smaller
        // slope standard error.
        let perturb = |scaled: &mut Vec<ScaledRecord>| {
            for (i, r) in scaled.iter_mut().enumerate() {
                r.ln_ppv += if i % 2 == 0 { 0.05 } else { -0.05 };
            }
        };

        let mut small = records_from_law(200.0, -1.4, &[5.0, 10.0, 20.0, 40.0]);
        perturb(&mut small);
        let mut large = records_from_law(
            200.0,
            -1.4,
            &[5.0, 6.5, 8.0, 10.0, 13.0, 16.0, 20.0, 26.0, 32.0, 40.0, 52.0, 64.0],
        );
        perturb(&mut large);

        let fit_small = fit_attenuation(&small).unwrap();
        let fit_large = fit_attenuation(&large).unwrap();
        assert!(fit_large.stderr_slope() < fit_small.stderr_slope());
    }
}
