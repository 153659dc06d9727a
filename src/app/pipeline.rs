//! Shared fit-pipeline logic behind the `fit` subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> scaled-distance transform -> OLS fit -> residuals -> curve grid
//!
//! The CLI layer can then focus on presentation (printing, plots, exports),
//! and tests can drive the whole pipeline without a terminal.

use crate::domain::{CurveGrid, FitConfig, FitResult, ScaledRecord};
use crate::error::AppError;
use crate::io::ingest::IngestedData;
use crate::report::{Outliers, ResidualRecord};

/// All computed outputs of a single `blast fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub scaled: Vec<ScaledRecord>,
    pub fit: FitResult,
    pub residuals: Vec<ResidualRecord>,
    pub outliers: Outliers,
    /// Fitted curve evaluated on evenly spaced SD points over the observed range.
    pub grid: CurveGrid,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Load + clean the monitoring CSV.
    let ingest = crate::io::ingest::load_blast_records(config)?;

    run_fit_with_ingest(config, ingest)
}

/// Execute the pipeline on already-ingested data (file-less entry point).
pub fn run_fit_with_ingest(
    config: &FitConfig,
    ingest: IngestedData,
) -> Result<RunOutput, AppError> {
    // 2) Derive SD / ln(PPV) / ln(SD).
    let scaled = crate::fit::derive_records(&ingest.records)?;

    // 3) Solve the log-linear regression and back-transform K, alpha.
    let fit = crate::fit::fit_attenuation(&scaled)?;

    // 4) Residual diagnostics.
    let residuals = crate::report::compute_residuals(&scaled, &fit)?;
    let outliers = crate::report::rank_outliers(&residuals, config.top_n);

    // 5) Fitted curve grid over the observed SD range.
    let (sd_min, sd_max) = sd_range(&scaled);
    let grid = crate::io::curve::build_grid(&fit.model, sd_min, sd_max, config.curve_points);

    Ok(RunOutput {
        ingest,
        scaled,
        fit,
        residuals,
        outliers,
        grid,
    })
}

fn sd_range(scaled: &[ScaledRecord]) -> (f64, f64) {
    let mut sd_min = f64::INFINITY;
    let mut sd_max = f64::NEG_INFINITY;
    for r in scaled {
        sd_min = sd_min.min(r.sd);
        sd_max = sd_max.max(r.sd);
    }
    (sd_min, sd_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnMap;
    use crate::error::ErrorKind;
    use crate::io::ingest::ingest_from_reader;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn config() -> FitConfig {
        FitConfig {
            csv_path: PathBuf::from("monitoring.csv"),
            columns: ColumnMap::default(),
            curve_points: 100,
            top_n: 3,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_records: None,
            export_curve: None,
            svg_log: None,
            svg_curve: None,
        }
    }

    fn ingest(csv: &str) -> IngestedData {
        ingest_from_reader(Cursor::new(csv.to_string()), &ColumnMap::default()).unwrap()
    }

    #[test]
    fn pipeline_end_to_end_on_the_worked_example() {
        // Two exact points of PPV = 100 * SD^-1.
        let csv = "PPV (mm/s),Distancia (m),Carga Maxima por Espera (kg)\n10,50,25\n5,100,25\n";
        let run = run_fit_with_ingest(&config(), ingest(csv)).unwrap();

        assert!((run.fit.model.k - 100.0).abs() < 1e-6);
        assert!((run.fit.model.alpha + 1.0).abs() < 1e-9);

        assert_eq!(run.grid.sd.len(), 100);
        assert!((run.grid.sd[0] - 10.0).abs() < 1e-9);
        assert!((run.grid.sd[99] - 20.0).abs() < 1e-9);
        // Grid values follow the back-transformed law.
        assert!((run.grid.ppv[0] - 10.0).abs() < 1e-6);
        assert!((run.grid.ppv[99] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn single_valid_row_is_underdetermined_not_a_crash() {
        let csv = "PPV (mm/s),Distancia (m),Carga Maxima por Espera (kg)\n10,50,25\n0,60,25\n";
        let err = run_fit_with_ingest(&config(), ingest(csv)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnderdeterminedFit);
    }
}
