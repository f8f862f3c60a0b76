//! Command-line parsing for the stem flux profile tool.
//!
//! Argument parsing stays separate from the loaders and the smoother; `app`
//! turns these structs into plain config values.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::DEFAULT_FRACTION;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stemflux", version, about = "Vertical CH4 flux profiles on tree stems (LOESS + residual band)")]
pub struct Cli {
    /// Directory holding the field and synthesis tables [env: STEMFLUX_DATA_DIR, default: .]
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Tracing filter, e.g. `debug` or `stem_flux=trace` [default: RUST_LOG, then info]
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every summary statistic for the field campaigns and the synthesis.
    Stats(StatsArgs),
    /// Render the composite field figure as SVG.
    Figure(FigureArgs),
    /// Smooth a height/flux profile read from any CSV.
    Profile(ProfileArgs),
    /// Smooth a seeded synthetic profile.
    Demo(DemoArgs),
    /// Plot a previously exported profile JSON.
    Plot(PlotArgs),
}

#[derive(Debug, Args, Clone)]
pub struct StatsArgs {
    /// Print the summaries as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct FigureArgs {
    /// Output SVG path.
    #[arg(long, default_value = "figure1_composite.svg")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct ProfileArgs {
    /// CSV file with one row per measurement.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Column holding the measurement height (m).
    #[arg(long, default_value = "height_m")]
    pub height_col: String,

    /// Column holding the CH4 flux.
    #[arg(long, default_value = "flux")]
    pub flux_col: String,

    /// Label used in the report and the exported JSON [default: file stem]
    #[arg(long)]
    pub label: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of synthetic measurements.
    #[arg(short = 'n', long, default_value_t = 40)]
    pub n: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the additive flux noise.
    #[arg(long, default_value_t = 0.15)]
    pub noise: f64,

    /// Lowest sampled height (m).
    #[arg(long, default_value_t = 0.2)]
    pub height_min: f64,

    /// Highest sampled height (m).
    #[arg(long, default_value_t = 12.0)]
    pub height_max: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Smoothing, terminal plot and export options shared by `profile` and `demo`.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// LOESS smoothing fraction, in (0, 1].
    #[arg(long, default_value_t = DEFAULT_FRACTION)]
    pub frac: f64,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,

    /// Export the profile (settings, curve, band, observations) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the curve and band to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

/// Options for plotting a saved profile.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Profile JSON produced by `--export-json`.
    #[arg(value_name = "JSON")]
    pub profile: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn profile_defaults() {
        let cli = Cli::parse_from(["stemflux", "profile", "tree.csv"]);
        let Command::Profile(args) = cli.command else {
            panic!("expected profile");
        };
        assert_eq!(args.height_col, "height_m");
        assert_eq!(args.flux_col, "flux");
        assert_eq!(args.output.frac, 0.6);
        assert!(!args.output.no_plot);
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "stemflux",
            "demo",
            "--seed",
            "7",
            "--frac",
            "0.7",
            "--data-dir",
            "/data",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Command::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.seed, 7);
        assert_eq!(args.output.frac, 0.7);
    }
}
