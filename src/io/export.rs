//! Export the derived per-record table to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per surviving observation with its derived quantities,
//! fitted value, and log-space residual.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::report::ResidualRecord;

/// Write per-record results to a CSV file.
pub fn write_records_csv(path: &Path, residuals: &[ResidualRecord]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::processing(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "line,date,ppv,distance,charge,sd,ln_sd,ln_ppv,ppv_fit,residual_ln"
    )
    .map_err(|e| AppError::processing(format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        let rec = &r.scaled.record;
        writeln!(
            file,
            "{},{},{:.6},{:.6},{:.6},{:.10},{:.10},{:.10},{:.6},{:.10}",
            rec.line,
            rec.date.map(|d| d.to_string()).unwrap_or_default(),
            rec.ppv,
            rec.distance,
            rec.charge,
            r.scaled.sd,
            r.scaled.ln_sd,
            r.scaled.ln_ppv,
            r.ppv_fit,
            r.residual,
        )
        .map_err(|e| AppError::processing(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
