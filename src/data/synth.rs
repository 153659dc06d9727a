//! Synthetic monitoring-data generation.
//!
//! `blast synth` produces a seeded CSV that follows a known attenuation law
//!
//! ```text
//! PPV = K0 · SD^alpha0 · exp(sigma · z),  z ~ N(0, 1)
//! ```
//!
//! Useful for demos and for end-to-end checks: with `sigma = 0` the fitter
//! must recover `(K0, alpha0)` exactly (up to numerical tolerance).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{BlastRecord, ColumnMap};
use crate::error::AppError;

/// Parameters of the synthetic dataset.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub count: usize,
    pub seed: u64,
    /// True attenuation coefficient K0.
    pub k: f64,
    /// True attenuation exponent alpha0 (typically negative).
    pub alpha: f64,
    /// Lognormal noise sigma (0 = noiseless).
    pub noise_sigma: f64,
    pub distance_min: f64,
    pub distance_max: f64,
    pub charge_min: f64,
    pub charge_max: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            count: 60,
            seed: 42,
            k: 400.0,
            alpha: -1.6,
            noise_sigma: 0.15,
            distance_min: 30.0,
            distance_max: 400.0,
            charge_min: 5.0,
            charge_max: 120.0,
        }
    }
}

/// Generate synthetic monitoring records. Deterministic for a fixed config.
pub fn generate_records(config: &SynthConfig) -> Result<Vec<BlastRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::processing("Synthetic record count must be > 0."));
    }
    if !(config.k.is_finite() && config.k > 0.0 && config.alpha.is_finite()) {
        return Err(AppError::processing(
            "Synthetic K must be finite and > 0, alpha finite.",
        ));
    }
    if !(config.noise_sigma.is_finite() && config.noise_sigma >= 0.0) {
        return Err(AppError::processing("Noise sigma must be finite and >= 0."));
    }
    if !(config.distance_min > 0.0 && config.distance_max >= config.distance_min) {
        return Err(AppError::processing("Invalid distance range."));
    }
    if !(config.charge_min > 0.0 && config.charge_max >= config.charge_min) {
        return Err(AppError::processing("Invalid charge range."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::processing(format!("Noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let distance = rng.gen_range(config.distance_min..=config.distance_max);
        let charge = rng.gen_range(config.charge_min..=config.charge_max);
        let sd = crate::fit::scaled_distance(distance, charge);

        let z: f64 = normal.sample(&mut rng);
        let ppv = config.k * sd.powf(config.alpha) * (config.noise_sigma * z).exp();

        records.push(BlastRecord {
            line: i + 2,
            ppv,
            distance,
            charge,
            date: None,
        });
    }

    Ok(records)
}

/// Write synthetic records as a CSV using the default column headers, so the
/// output feeds straight back into `blast fit` with no mapping flags.
pub fn write_synth_csv(path: &Path, records: &[BlastRecord]) -> Result<(), AppError> {
    let columns = ColumnMap::default();
    let mut file = File::create(path).map_err(|e| {
        AppError::processing(format!(
            "Failed to create synthetic CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "{},{},{}", columns.ppv, columns.distance, columns.charge)
        .map_err(|e| AppError::processing(format!("Failed to write synthetic CSV: {e}")))?;
    for r in records {
        writeln!(file, "{:.6},{:.6},{:.6}", r.ppv, r.distance, r.charge)
            .map_err(|e| AppError::processing(format!("Failed to write synthetic CSV: {e}")))?;
    }

    Ok(())
}
