//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{FitConfig, FitResult};
use crate::io::ingest::IngestedData;
use crate::report::{Outliers, ResidualRecord};

/// Format the full run summary (column report + dataset stats + fit).
pub fn format_run_summary(ingest: &IngestedData, fit: &FitResult, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== blast - PPV attenuation fit ===\n");
    out.push_str(&format!("Input: {}\n", config.csv_path.display()));

    out.push_str("Columns:\n");
    for c in &ingest.column_report {
        match c.index {
            Some(idx) => out.push_str(&format!(
                "  {:<8} <- `{}` (column {})\n",
                c.field,
                c.header,
                idx + 1
            )),
            None => out.push_str(&format!(
                "  {:<8} <- `{}` NOT FOUND{}\n",
                c.field,
                c.header,
                if c.required { "" } else { " (optional)" }
            )),
        }
    }

    let skipped = ingest.rows_read - ingest.rows_used;
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        ingest.rows_read, ingest.rows_used, skipped
    ));
    if !ingest.row_errors.is_empty() {
        out.push_str("Skipped rows:\n");
        for e in &ingest.row_errors {
            out.push_str(&format!("  line {}: {}\n", e.line, e.message));
        }
    }

    out.push_str(&format!(
        "Records: ppv=[{:.2}, {:.2}] mm/s | distance=[{:.1}, {:.1}] m | charge=[{:.1}, {:.1}] kg\n",
        ingest.stats.ppv_min,
        ingest.stats.ppv_max,
        ingest.stats.distance_min,
        ingest.stats.distance_max,
        ingest.stats.charge_min,
        ingest.stats.charge_max,
    ));

    out.push_str("\nFit (ln PPV = A + B ln SD):\n");
    out.push_str(&format!(
        "  A = {:.6} (± {:.6})   [A = ln K]\n",
        fit.model.intercept(),
        fit.stderr_intercept()
    ));
    out.push_str(&format!(
        "  B = {:.6} (± {:.6})   [B = alpha]\n",
        fit.model.slope(),
        fit.stderr_slope()
    ));
    out.push_str(&format!("  K     = {:.4}\n", fit.model.k));
    out.push_str(&format!("  alpha = {:.4}\n", fit.model.alpha));
    out.push_str(&format!(
        "  RMSE(ln) = {:.4} | R^2 = {:.4} | n = {}\n",
        fit.quality.rmse, fit.quality.r2, fit.quality.n
    ));

    out
}

/// Format the above/below-model residual tables.
pub fn format_outliers(outliers: &Outliers) -> String {
    let mut out = String::new();

    out.push_str("Most above model (positive ln residual):\n");
    out.push_str(&format_table(&outliers.above));
    out.push('\n');

    out.push_str("Most below model (negative ln residual):\n");
    out.push_str(&format_table(&outliers.below));

    out
}

fn format_table(rows: &[ResidualRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>6} {:>10} {:>10} {:>10} {:>10} {:>12}  {}\n",
        "line", "sd", "ppv_obs", "ppv_fit", "resid_ln", "ratio", "date"
    ));
    out.push_str(&format!(
        "{:->6} {:->10} {:->10} {:->10} {:->10} {:->12}  {:->10}\n",
        "", "", "", "", "", "", ""
    ));

    for r in rows {
        let rec = &r.scaled.record;
        out.push_str(&format!(
            "{:>6} {:>10.3} {:>10.3} {:>10.3} {:>10.4} {:>12.3}  {}\n",
            rec.line,
            r.scaled.sd,
            rec.ppv,
            r.ppv_fit,
            r.residual,
            rec.ppv / r.ppv_fit,
            rec.date.map(|d| d.to_string()).unwrap_or_default(),
        ));
    }

    out
}
