//! Shared pipeline logic used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! tariffs + readings -> merge -> interpolate -> cost -> views
//!
//! The subcommands can then focus on presentation (printing vs report files).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::aggregate::{Totals, Views, build_views, grand_total};
use crate::domain::{
    CostConfig, CostedReading, DuplicatePolicy, InterpolatedReading, SourceConfig, ViewConfig,
};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::series::cost::calculate;
use crate::series::interpolate::interpolate;
use crate::series::{FileLoad, ReadingSeries};
use crate::tariff::{LoadedSchedule, TariffSchedule};

/// Tariffs and readings as loaded from disk.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub tariff_path: PathBuf,
    pub tariffs: LoadedSchedule,
    pub series: ReadingSeries,
    pub files: Vec<FileLoad>,
}

impl Inputs {
    pub fn schedule(&self) -> &TariffSchedule {
        &self.tariffs.schedule
    }

    /// Lines skipped across every input file.
    pub fn skipped_lines(&self) -> usize {
        self.tariffs.line_errors.len() + self.files.iter().map(|f| f.line_errors.len()).sum::<usize>()
    }
}

/// Output of the sequential phases: interpolated readings and costed days.
#[derive(Debug, Clone)]
pub struct CostedRun {
    pub inputs: Inputs,
    pub costs: CostConfig,
    pub readings: Vec<InterpolatedReading>,
    pub daily: Vec<CostedReading>,
}

impl CostedRun {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.daily.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.daily.last().map(|r| r.date)
    }

    pub fn interpolated_days(&self) -> usize {
        self.readings.iter().filter(|r| r.interpolated).count()
    }

    /// Days before the first tariff record (costed at zero rates).
    pub fn unpriced_days(&self) -> usize {
        self.daily.iter().filter(|r| r.rates.effective_from.is_none()).count()
    }
}

/// All computed outputs of a `meter report` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub run: CostedRun,
    pub views: Views,
    pub view_config: ViewConfig,
    pub totals: Totals,
}

/// Load the tariff file.
pub fn load_schedule(path: &Path) -> Result<LoadedSchedule, AppError> {
    TariffSchedule::load(path)
}

/// Merge every reading file, in order, into one series.
pub fn load_series(paths: &[PathBuf], policy: DuplicatePolicy) -> Result<(ReadingSeries, Vec<FileLoad>), AppError> {
    if paths.is_empty() {
        return Err(AppError::input("No reading files given (use --readings or METER_READINGS)."));
    }

    let mut series = ReadingSeries::with_policy(policy);
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(series.load_from_file(path)?);
    }
    Ok((series, files))
}

/// Load tariffs first, then readings.
pub fn load_inputs(sources: &SourceConfig) -> Result<Inputs, AppError> {
    let tariffs = load_schedule(&sources.tariff_path)?;
    let (series, files) = load_series(&sources.reading_paths, sources.on_duplicate)?;
    Ok(Inputs {
        tariff_path: sources.tariff_path.clone(),
        tariffs,
        series,
        files,
    })
}

fn ensure_readings(series: &ReadingSeries) -> Result<(), AppError> {
    if series.is_empty() {
        return Err(AppError::new(
            EXIT_NO_DATA,
            "No valid readings remain after ingestion.",
        ));
    }
    Ok(())
}

/// Load and gap-fill readings only; no tariff file is involved.
pub fn run_readings(paths: &[PathBuf], policy: DuplicatePolicy) -> Result<Vec<InterpolatedReading>, AppError> {
    let (series, _) = load_series(paths, policy)?;
    ensure_readings(&series)?;
    Ok(interpolate(&series.finalize()))
}

/// Interpolate and cost already-loaded inputs.
pub fn cost_inputs(inputs: Inputs, costs: &CostConfig) -> Result<CostedRun, AppError> {
    ensure_readings(&inputs.series)?;

    let readings = interpolate(&inputs.series.finalize());
    let daily = calculate(&readings, inputs.schedule(), costs);

    Ok(CostedRun {
        inputs,
        costs: *costs,
        readings,
        daily,
    })
}

/// Load, interpolate and cost.
pub fn run_costs(sources: &SourceConfig, costs: &CostConfig) -> Result<CostedRun, AppError> {
    cost_inputs(load_inputs(sources)?, costs)
}

/// Execute the full pipeline and return every computed view.
pub fn run_report(sources: &SourceConfig, costs: &CostConfig, views: &ViewConfig) -> Result<RunOutput, AppError> {
    let run = run_costs(sources, costs)?;
    let built = build_views(&run.daily, views);
    let totals = grand_total(&run.daily);

    info!(
        days = run.daily.len(),
        total_cost = totals.total_cost,
        "pipeline complete"
    );

    Ok(RunOutput {
        run,
        views: built,
        view_config: *views,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn inputs(series: ReadingSeries, schedule: TariffSchedule) -> Inputs {
        Inputs {
            tariff_path: PathBuf::from("tariffs.dat"),
            tariffs: LoadedSchedule {
                schedule,
                line_errors: Vec::new(),
                lines_read: 0,
            },
            series,
            files: Vec::new(),
        }
    }

    #[test]
    fn three_day_scenario() {
        let schedule = TariffSchedule::with_rate(2.0, 3.0, 4.0, 5.0, d(2023, 1, 31));
        let mut series = ReadingSeries::new();
        series.add_reading(d(2023, 1, 31), 0.0, 0.0);
        series.add_reading(d(2023, 2, 2), 4.0, 10.0);

        let costs = CostConfig::default();
        let run = cost_inputs(inputs(series, schedule), &costs).unwrap();

        assert_eq!(run.readings.len(), 3);
        assert_eq!(run.interpolated_days(), 1);
        assert_eq!(run.first_date(), Some(d(2023, 1, 31)));

        let feb1 = run.daily[1];
        assert_eq!(feb1.date, d(2023, 2, 1));
        assert!((feb1.gas_used - 5.0).abs() < 1e-12);
        assert!((feb1.elec_used - 2.0).abs() < 1e-12);
        let expected = costs.tax_factor * (2.0 + 5.0 * 3.0 * costs.gas_volume_to_energy_factor);
        assert!((feb1.gas_cost - expected).abs() < 1e-9);
        assert_eq!(run.unpriced_days(), 0);
    }

    #[test]
    fn empty_series_is_no_data() {
        let err = cost_inputs(inputs(ReadingSeries::new(), TariffSchedule::new()), &CostConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NO_DATA);
    }

    #[test]
    fn no_reading_files_is_an_input_error() {
        let err = load_series(&[], DuplicatePolicy::Replace).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn readings_alone_are_gap_filled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.dat");
        std::fs::write(&path, "01/01/2023 10 100\n05/01/2023 14 140\n").unwrap();

        let readings = run_readings(&[path], DuplicatePolicy::Replace).unwrap();

        assert_eq!(readings.len(), 5);
        assert!(readings[2].interpolated);
        assert_eq!(readings[2].reading.gas_meter, 120.0);
    }

    #[test]
    fn readings_without_valid_rows_are_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.dat");
        std::fs::write(&path, "# nothing yet\n").unwrap();

        let err = run_readings(&[path], DuplicatePolicy::Replace).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_NO_DATA);
    }
}
