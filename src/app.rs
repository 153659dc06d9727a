//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the ingest/transform/fit pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, SynthArgs};
use crate::data::SynthConfig;
use crate::domain::{ColumnMap, FitConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `blast` binary.
pub fn run() -> Result<(), AppError> {
    // We want `blast monitoring.csv` to behave like `blast fit monitoring.csv`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This keeps the clap structure clean while
    // making the common case a one-word command.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.fit, &config)
    );
    println!("{}", crate::report::format_outliers(&run.outliers));

    if config.plot {
        // (a) log-log fit with the regression line.
        let ln_points: Vec<(f64, f64)> =
            run.scaled.iter().map(|r| (r.ln_sd, r.ln_ppv)).collect();
        let ln_curve: Vec<(f64, f64)> = run
            .grid
            .sd
            .iter()
            .map(|&sd| (sd.ln(), run.fit.model.predict_ln(sd.ln())))
            .collect();
        println!(
            "{}",
            crate::plot::render_ascii_plot(
                "ln(PPV) vs ln(SD)",
                &ln_points,
                &ln_curve,
                config.plot_width,
                config.plot_height,
            )
        );

        // (b) original scale with the back-transformed curve.
        let points: Vec<(f64, f64)> =
            run.scaled.iter().map(|r| (r.sd, r.record.ppv)).collect();
        let curve: Vec<(f64, f64)> = run
            .grid
            .sd
            .iter()
            .zip(run.grid.ppv.iter())
            .map(|(&s, &p)| (s, p))
            .collect();
        println!(
            "{}",
            crate::plot::render_ascii_plot(
                "PPV vs SD",
                &points,
                &curve,
                config.plot_width,
                config.plot_height,
            )
        );
    }

    // Optional SVG charts.
    if let Some(path) = &config.svg_log {
        let ln_points: Vec<(f64, f64)> =
            run.scaled.iter().map(|r| (r.ln_sd, r.ln_ppv)).collect();
        crate::plot::write_log_fit_svg(path, &ln_points, &run.fit)?;
        println!("Wrote log-log chart to {}", path.display());
    }
    if let Some(path) = &config.svg_curve {
        let points: Vec<(f64, f64)> =
            run.scaled.iter().map(|r| (r.sd, r.record.ppv)).collect();
        crate::plot::write_curve_svg(path, &points, &run.grid, &run.fit)?;
        println!("Wrote curve chart to {}", path.display());
    }

    // Optional exports.
    if let Some(path) = &config.export_records {
        crate::io::export::write_records_csv(path, &run.residuals)?;
        println!("Wrote derived records to {}", path.display());
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &run.fit, &run.grid)?;
        println!("Wrote curve JSON to {}", path.display());
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;

    let series: Vec<(f64, f64)> = curve
        .grid
        .sd
        .iter()
        .zip(curve.grid.ppv.iter())
        .map(|(&s, &p)| (s, p))
        .collect();

    println!(
        "K = {:.4} | alpha = {:.4} (RMSE(ln) = {:.4}, n = {})",
        curve.model.k, curve.model.alpha, curve.quality.rmse, curve.quality.n
    );
    println!(
        "{}",
        crate::plot::render_ascii_plot("PPV vs SD", &[], &series, args.width, args.height)
    );
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = SynthConfig {
        count: args.count,
        seed: args.seed,
        k: args.k,
        alpha: args.alpha,
        noise_sigma: args.noise,
        distance_min: args.distance_min,
        distance_max: args.distance_max,
        charge_min: args.charge_min,
        charge_max: args.charge_max,
    };

    let records = crate::data::generate_records(&config)?;
    crate::data::write_synth_csv(&args.out, &records)?;
    println!(
        "Wrote {} synthetic records to {} (K0 = {:.4}, alpha0 = {:.4}, sigma = {})",
        records.len(),
        args.out.display(),
        config.k,
        config.alpha,
        config.noise_sigma
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        columns: ColumnMap {
            ppv: args.ppv_col.clone(),
            distance: args.distance_col.clone(),
            charge: args.charge_col.clone(),
            date: args.date_col.clone(),
        },
        curve_points: args.curve_points,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_records: args.export.clone(),
        export_curve: args.export_curve.clone(),
        svg_log: args.svg_log.clone(),
        svg_curve: args.svg_curve.clone(),
    }
}

/// Rewrite argv so a bare CSV path defaults to the `fit` subcommand.
///
/// Rules:
/// - `blast data.csv ...`          -> `blast fit data.csv ...`
/// - `blast --help/--version/-h`   -> unchanged (top-level help/version)
/// - `blast fit|plot|synth ...`    -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot" | "synth");
    if is_subcommand {
        return argv;
    }

    // A leading flag or a bare path both mean "fit".
    argv.insert(1, "fit".to_string());
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewritten(args: &[&str]) -> Vec<String> {
        rewrite_args(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn bare_path_defaults_to_fit() {
        assert_eq!(rewritten(&["blast", "data.csv"]), ["blast", "fit", "data.csv"]);
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewritten(&["blast", "synth", "--out", "x.csv"]).first().map(String::as_str), Some("blast"));
        assert_eq!(rewritten(&["blast", "plot", "--curve", "c.json"])[1], "plot");
        assert_eq!(rewritten(&["blast", "--help"]), ["blast", "--help"]);
        assert_eq!(rewritten(&["blast"]), ["blast"]);
    }
}
