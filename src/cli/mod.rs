//! Command-line parsing for the `meter` utility cost tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest/costing code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_GAS_VOLUME_TO_ENERGY_FACTOR, DEFAULT_SMOOTHING_WINDOW, DEFAULT_TAX_FACTOR, DuplicatePolicy,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "meter", version, about = "Household gas/electricity cost reconciliation")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full pipeline, write every report file and print a summary.
    Report(ReportArgs),
    /// Print the tariff record in force on each given date.
    Rate(RateArgs),
    /// Print the merged meter readings after gap filling.
    Readings(ReadingArgs),
    /// Print the daily cost table.
    Costs(CostsArgs),
}

/// Reading files and merge behaviour.
#[derive(Debug, Args, Clone)]
pub struct ReadingArgs {
    /// Reading file(s) (`dd/mm/yyyy elec gas`), merged in the given order.
    #[arg(
        long,
        value_name = "PATH",
        env = "METER_READINGS",
        value_delimiter = ',',
        required = true
    )]
    pub readings: Vec<PathBuf>,

    /// What to do when two readings share a date.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Replace)]
    pub on_duplicate: DuplicatePolicy,
}

/// Tariff file plus readings.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Tariff file (`dd/mm/yyyy gas_standing gas_unit elec_standing elec_unit`).
    #[arg(long, value_name = "PATH", env = "METER_TARIFFS")]
    pub tariffs: PathBuf,

    #[command(flatten)]
    pub series: ReadingArgs,
}

/// Pricing constants.
#[derive(Debug, Args, Clone)]
pub struct CostArgs {
    /// Gas volume-to-energy conversion factor.
    #[arg(long, default_value_t = DEFAULT_GAS_VOLUME_TO_ENERGY_FACTOR)]
    pub gas_factor: f64,

    /// Multiplicative tax applied to every cost (1.05 = 5%).
    #[arg(long, default_value_t = DEFAULT_TAX_FACTOR)]
    pub tax_factor: f64,
}

/// Options for `meter report`.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub cost: CostArgs,

    /// Directory for report files (created if missing).
    #[arg(long, value_name = "DIR", default_value = "reports")]
    pub out: PathBuf,

    /// Per-weekday averages only use days after this date.
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub weekday_since: Option<NaiveDate>,

    /// Trailing window (days) of the smoothed view.
    #[arg(long, default_value_t = DEFAULT_SMOOTHING_WINDOW)]
    pub window: usize,

    /// Print an ASCII plot of daily and smoothed cost.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the costed daily series to CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Export a JSON run summary.
    #[arg(long = "export-summary", value_name = "PATH")]
    pub export_summary: Option<PathBuf>,
}

/// Options for `meter rate`.
#[derive(Debug, Args, Clone)]
pub struct RateArgs {
    /// Tariff file.
    #[arg(long, value_name = "PATH", env = "METER_TARIFFS")]
    pub tariffs: PathBuf,

    /// Dates to look up (`yyyy-mm-dd` or `dd/mm/yyyy`).
    #[arg(value_name = "DATE", required = true, value_parser = parse_cli_date)]
    pub dates: Vec<NaiveDate>,
}

/// Options for `meter costs`.
#[derive(Debug, Args, Clone)]
pub struct CostsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub cost: CostArgs,

    /// First date to print (inclusive).
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub from: Option<NaiveDate>,

    /// Last date to print (inclusive).
    #[arg(long, value_name = "DATE", value_parser = parse_cli_date)]
    pub to: Option<NaiveDate>,
}

/// Accept ISO dates as well as the `dd/mm/yyyy` form used in the data files.
pub fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").or_else(|_| crate::io::ingest::parse_date(s))
}
