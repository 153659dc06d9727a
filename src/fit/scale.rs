//! Scaled-distance transform.
//!
//! Pure and deterministic: given a cleaned record, compute
//!
//! ```text
//! SD     = distance / sqrt(charge)
//! ln_SD  = ln(SD)
//! ln_PPV = ln(PPV)
//! ```
//!
//! Ingest already guarantees positivity, but the transform re-checks it and
//! propagates a failure rather than emitting NaN/-inf into the regression.

use crate::domain::{BlastRecord, ScaledRecord};
use crate::error::AppError;

/// Scaled distance `distance / sqrt(charge)`.
///
/// Callers must pass positive values; the result is meaningless otherwise.
pub fn scaled_distance(distance: f64, charge: f64) -> f64 {
    distance / charge.sqrt()
}

/// Derive the log-space quantities for one record.
pub fn derive_record(record: &BlastRecord) -> Result<ScaledRecord, AppError> {
    if !(record.ppv > 0.0 && record.distance > 0.0 && record.charge > 0.0)
        || !(record.ppv.is_finite() && record.distance.is_finite() && record.charge.is_finite())
    {
        return Err(AppError::processing(format!(
            "Non-positive value reached the transform (line {}): ppv={}, distance={}, charge={}.",
            record.line, record.ppv, record.distance, record.charge
        )));
    }

    let sd = scaled_distance(record.distance, record.charge);
    Ok(ScaledRecord {
        record: record.clone(),
        sd,
        ln_ppv: record.ppv.ln(),
        ln_sd: sd.ln(),
    })
}

/// Derive the log-space quantities for every record, preserving order.
pub fn derive_records(records: &[BlastRecord]) -> Result<Vec<ScaledRecord>, AppError> {
    records.iter().map(derive_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ppv: f64, distance: f64, charge: f64) -> BlastRecord {
        BlastRecord {
            line: 2,
            ppv,
            distance,
            charge,
            date: None,
        }
    }

    #[test]
    fn scaled_distance_worked_examples() {
        // 50 / sqrt(25) = 10, 100 / sqrt(25) = 20.
        assert!((scaled_distance(50.0, 25.0) - 10.0).abs() < 1e-12);
        assert!((scaled_distance(100.0, 25.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn derive_record_computes_logs() {
        let scaled = derive_record(&record(10.0, 50.0, 25.0)).unwrap();
        assert!((scaled.sd - 10.0).abs() < 1e-12);
        assert!((scaled.ln_sd - 10.0_f64.ln()).abs() < 1e-12);
        assert!((scaled.ln_ppv - 10.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn derive_record_is_idempotent() {
        let r = record(3.7, 81.5, 12.25);
        let a = derive_record(&r).unwrap();
        let b = derive_record(&r).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn derive_record_rejects_non_positive_input() {
        assert!(derive_record(&record(0.0, 50.0, 25.0)).is_err());
        assert!(derive_record(&record(10.0, -1.0, 25.0)).is_err());
        assert!(derive_record(&record(10.0, 50.0, 0.0)).is_err());
        assert!(derive_record(&record(f64::NAN, 50.0, 25.0)).is_err());
    }
}
