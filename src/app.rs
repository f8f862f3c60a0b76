//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main:
//! - loads `.env` and parses CLI arguments
//! - installs the tracing subscriber
//! - runs the requested pipeline
//! - prints reports/plots to stdout

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Cli, Command, DemoArgs, OutputArgs, PlotArgs, ProfileArgs, StatsArgs};
use crate::data::SyntheticSpec;
use crate::domain::{DataConfig, ProfileConfig};
use crate::error::AppError;
use crate::io::{profile_from_file, read_profile_json};
use crate::plot::render_profile_ascii;
use crate::report::{format_field_summary, format_insufficient, format_profile_summary, format_synthesis_summary};

pub mod pipeline;

pub const DATA_DIR_ENV: &str = "STEMFLUX_DATA_DIR";

/// Entry point for the `stemflux` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    crate::logging::init_tracing(cli.log_level.as_deref())?;

    let data = DataConfig::in_dir(&resolve_data_dir(cli.data_dir.clone()));

    match cli.command {
        Command::Stats(args) => handle_stats(&data, &args),
        Command::Figure(args) => {
            let figure = pipeline::run_figure(&data, &args.out)?;
            println!(
                "Wrote {} ({} Harvard Forest panels{})",
                args.out.display(),
                figure.harvard.len(),
                if figure.yale.is_some() { " + Yale Myers Forest" } else { "" }
            );
            Ok(())
        }
        Command::Profile(args) => handle_profile(&args),
        Command::Demo(args) => handle_demo(&args),
        Command::Plot(args) => handle_plot(&args),
    }
}

/// `--data-dir`, then `STEMFLUX_DATA_DIR`, then the working directory.
pub fn resolve_data_dir(cli_value: Option<PathBuf>) -> PathBuf {
    cli_value
        .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn handle_stats(data: &DataConfig, args: &StatsArgs) -> Result<(), AppError> {
    let stats = pipeline::run_stats(data)?;
    if args.json {
        let text = serde_json::to_string_pretty(&stats)
            .map_err(|e| AppError::compute(format!("Failed to serialize summaries: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", format_field_summary(&stats.field));
        print!("{}", format_synthesis_summary(&stats.synthesis));
    }
    Ok(())
}

fn handle_profile(args: &ProfileArgs) -> Result<(), AppError> {
    let label = args.label.clone().unwrap_or_else(|| file_label(&args.input));
    let config = profile_config(label, &args.output)?;
    let run = pipeline::run_profile_csv(&args.input, &args.height_col, &args.flux_col, &config)?;
    print_run(&run, &config);
    Ok(())
}

fn handle_demo(args: &DemoArgs) -> Result<(), AppError> {
    let spec = SyntheticSpec {
        n: args.n,
        seed: args.seed,
        height_min: args.height_min,
        height_max: args.height_max,
        noise: args.noise,
        ..SyntheticSpec::default()
    };
    let config = profile_config(format!("synthetic, seed {}", args.seed), &args.output)?;
    let run = pipeline::run_demo(&spec, &config)?;
    print_run(&run, &config);
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let file = read_profile_json(&args.profile)?;
    let profile = profile_from_file(&file);
    println!("{}", format_profile_summary(&file.label, &profile));
    println!(
        "{}",
        render_profile_ascii(&file.observations, Some(&profile), args.width, args.height)
    );
    Ok(())
}

fn print_run(run: &pipeline::ProfileRun, config: &ProfileConfig) {
    match &run.profile {
        Some(p) => println!("{}", format_profile_summary(&config.label, p)),
        None => println!("{}", format_insufficient(&config.label, run.observations.len())),
    }
    if config.plot {
        println!(
            "{}",
            render_profile_ascii(&run.observations, run.profile.as_ref(), config.plot_width, config.plot_height)
        );
    }
}

pub fn profile_config(label: String, args: &OutputArgs) -> Result<ProfileConfig, AppError> {
    if !(args.frac.is_finite() && args.frac > 0.0 && args.frac <= 1.0) {
        return Err(AppError::input(format!("--frac must be in (0, 1], got {}.", args.frac)));
    }
    Ok(ProfileConfig {
        label,
        fraction: args.frac,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
    })
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile".to_string())
}
