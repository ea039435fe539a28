//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs the ingest/costing pipeline
//! - prints summaries/tables/plots and writes report files and exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::{Command, CostArgs, CostsArgs, RateArgs, ReadingArgs, ReportArgs, SourceArgs};
use crate::domain::{CostConfig, OutputConfig, RunConfig, SourceConfig, ViewConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `meter` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; explicit flags and the real environment win.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Rate(args) => handle_rate(args),
        Command::Readings(args) => handle_readings(args),
        Command::Costs(args) => handle_costs(args),
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let output = pipeline::run_report(&config.sources, &config.costs, &config.views)?;

    println!("{}", crate::report::format_run_summary(&output));
    println!("{}", crate::report::monthly_table(&output.views.monthly));

    if config.output.plot {
        let plot = crate::plot::render_cost_plot(
            &output.run.daily,
            &output.views.smoothed,
            config.output.plot_width,
            config.output.plot_height,
        );
        println!("{plot}");
    }

    let written = crate::io::export::write_reports(
        &config.output.out_dir,
        &output.run.daily,
        &output.views,
        &output.view_config,
    )?;
    println!(
        "Wrote {} report files to {}",
        written.len(),
        config.output.out_dir.display()
    );

    if let Some(path) = &config.output.export_csv {
        crate::io::export::write_daily_csv(path, &output.run.daily)?;
    }
    if let Some(path) = &config.output.export_summary {
        crate::io::summary::write_summary_json(path, &output)?;
    }

    Ok(())
}

fn handle_rate(args: RateArgs) -> Result<(), AppError> {
    let loaded = pipeline::load_schedule(&args.tariffs)?;
    info!(records = loaded.schedule.len(), "tariffs loaded");
    print!("{}", crate::report::rate_lookup(&loaded.schedule, &args.dates));
    Ok(())
}

fn handle_readings(args: ReadingArgs) -> Result<(), AppError> {
    let readings = pipeline::run_readings(&args.readings, args.on_duplicate)?;
    print!("{}", crate::report::readings_table(&readings));
    Ok(())
}

fn handle_costs(args: CostsArgs) -> Result<(), AppError> {
    if let (Some(from), Some(to)) = (args.from, args.to) {
        if from > to {
            return Err(AppError::input(format!("--from {from} is after --to {to}.")));
        }
    }

    let run = pipeline::run_costs(&source_config_from_args(&args.source), &cost_config_from_args(&args.cost))?;
    let selected: Vec<_> = run
        .daily
        .iter()
        .filter(|r| args.from.is_none_or(|from| r.date >= from))
        .filter(|r| args.to.is_none_or(|to| r.date <= to))
        .copied()
        .collect();

    print!("{}", crate::report::format_costed_run(&run));
    println!();
    print!("{}", crate::report::daily_table(&selected));
    Ok(())
}

pub fn source_config_from_args(args: &SourceArgs) -> SourceConfig {
    SourceConfig {
        tariff_path: args.tariffs.clone(),
        reading_paths: args.series.readings.clone(),
        on_duplicate: args.series.on_duplicate,
    }
}

pub fn cost_config_from_args(args: &CostArgs) -> CostConfig {
    CostConfig {
        gas_volume_to_energy_factor: args.gas_factor,
        tax_factor: args.tax_factor,
    }
}

pub fn run_config_from_args(args: &ReportArgs) -> RunConfig {
    RunConfig {
        sources: source_config_from_args(&args.source),
        costs: cost_config_from_args(&args.cost),
        views: ViewConfig {
            weekday_since: args.weekday_since,
            smoothing_window: args.window,
        },
        output: OutputConfig {
            out_dir: args.out.clone(),
            plot: args.plot,
            plot_width: args.width,
            plot_height: args.height,
            export_csv: args.export_csv.clone(),
            export_summary: args.export_summary.clone(),
        },
    }
}
