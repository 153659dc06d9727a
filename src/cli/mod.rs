//! Command-line parsing for the attenuation fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "blast",
    version,
    about = "Blast-vibration attenuation fitter (PPV = K * SD^alpha)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the attenuation law to a monitoring CSV, print the report,
    /// and optionally plot/export.
    Fit(FitArgs),
    /// Re-render a previously exported curve JSON.
    Plot(PlotArgs),
    /// Generate a synthetic monitoring CSV following a known law.
    Synth(SynthArgs),
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Monitoring CSV (export the spreadsheet sheet to CSV first).
    pub csv: PathBuf,

    /// Header of the PPV column (mm/s).
    #[arg(long = "ppv-col", default_value = "PPV (mm/s)")]
    pub ppv_col: String,

    /// Header of the distance column (m).
    #[arg(long = "distance-col", default_value = "Distancia (m)")]
    pub distance_col: String,

    /// Header of the charge-per-delay column (kg).
    #[arg(long = "charge-col", default_value = "Carga Maxima por Espera (kg)")]
    pub charge_col: String,

    /// Optional header of a blast-date column (passed through to exports).
    #[arg(long = "date-col")]
    pub date_col: Option<String>,

    /// Points on the fitted SD grid (evenly spaced over the observed range).
    #[arg(long, default_value_t = 100)]
    pub curve_points: usize,

    /// Rows shown in the above/below-model residual tables.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Render the ASCII plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the derived per-record table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fitted curve (model + grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// Write the log-log fit chart to an SVG file.
    #[arg(long = "svg-log")]
    pub svg_log: Option<PathBuf>,

    /// Write the original-scale curve chart to an SVG file.
    #[arg(long = "svg-curve")]
    pub svg_curve: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `blast fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser)]
pub struct SynthArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of synthetic records.
    #[arg(short = 'n', long, default_value_t = 60)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// True attenuation coefficient K0.
    #[arg(long, default_value_t = 400.0)]
    pub k: f64,

    /// True attenuation exponent alpha0.
    #[arg(long, default_value_t = -1.6, allow_hyphen_values = true)]
    pub alpha: f64,

    /// Lognormal noise sigma (0 = noiseless).
    #[arg(long, default_value_t = 0.15)]
    pub noise: f64,

    /// Minimum monitor-to-blast distance (m).
    #[arg(long, default_value_t = 30.0)]
    pub distance_min: f64,

    /// Maximum monitor-to-blast distance (m).
    #[arg(long, default_value_t = 400.0)]
    pub distance_max: f64,

    /// Minimum charge per delay (kg).
    #[arg(long, default_value_t = 5.0)]
    pub charge_min: f64,

    /// Maximum charge per delay (kg).
    #[arg(long, default_value_t = 120.0)]
    pub charge_max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_args_defaults_match_the_original_labels() {
        let cli = Cli::parse_from(["blast", "fit", "monitoring.csv"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(args.ppv_col, "PPV (mm/s)");
        assert_eq!(args.distance_col, "Distancia (m)");
        assert_eq!(args.charge_col, "Carga Maxima por Espera (kg)");
        assert_eq!(args.curve_points, 100);
        assert!(args.plot && !args.no_plot);
    }

    #[test]
    fn synth_accepts_negative_alpha() {
        let cli = Cli::parse_from(["blast", "synth", "--out", "x.csv", "--alpha", "-1.8"]);
        let Command::Synth(args) = cli.command else {
            panic!("expected synth subcommand");
        };
        assert_eq!(args.alpha, -1.8);
    }
}
