//! Write report files and the daily CSV export.
//!
//! Report files are plain text produced by `report::format`; the CSV export is
//! meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::Views;
use crate::domain::{CostedReading, ViewConfig};
use crate::error::AppError;
use crate::report;

/// One flat CSV row per costed day.
#[derive(Debug, Serialize)]
struct DailyCsvRow {
    date: NaiveDate,
    gas_meter: f64,
    elec_meter: f64,
    interpolated: bool,
    gas_used: f64,
    elec_used: f64,
    rates_effective_from: Option<NaiveDate>,
    gas_standing_charge: f64,
    gas_unit_rate: f64,
    elec_standing_charge: f64,
    elec_unit_rate: f64,
    gas_cost: f64,
    elec_cost: f64,
    total_cost: f64,
}

impl From<&CostedReading> for DailyCsvRow {
    fn from(r: &CostedReading) -> Self {
        Self {
            date: r.date,
            gas_meter: r.gas_meter,
            elec_meter: r.elec_meter,
            interpolated: r.interpolated,
            gas_used: r.gas_used,
            elec_used: r.elec_used,
            rates_effective_from: r.rates.effective_from,
            gas_standing_charge: r.rates.gas_standing_charge,
            gas_unit_rate: r.rates.gas_unit_rate,
            elec_standing_charge: r.rates.elec_standing_charge,
            elec_unit_rate: r.rates.elec_unit_rate,
            gas_cost: r.gas_cost,
            elec_cost: r.elec_cost,
            total_cost: r.total_cost,
        }
    }
}

/// Write every report file into `out_dir` (created if missing).
///
/// Returns the written paths in a stable order: daily, weekly, weekday,
/// monthly, one file per year, smoothed.
pub fn write_reports(
    out_dir: &Path,
    daily: &[CostedReading],
    views: &Views,
    view_config: &ViewConfig,
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(out_dir).map_err(|e| {
        AppError::output(format!(
            "Failed to create output directory '{}': {e}",
            out_dir.display()
        ))
    })?;

    let mut files = vec![
        ("daily.txt".to_string(), report::daily_table(daily)),
        ("weekly.txt".to_string(), report::weekly_table(&views.weekly)),
        (
            "weekday.txt".to_string(),
            report::weekday_table(&views.weekday, view_config.weekday_since),
        ),
        ("monthly.txt".to_string(), report::monthly_table(&views.monthly)),
    ];
    for slice in &views.yearly {
        files.push((format!("year-{}.txt", slice.year), report::year_table(slice)));
    }
    files.push((
        "smoothed.txt".to_string(),
        report::smoothed_table(&views.smoothed, view_config.smoothing_window),
    ));

    let mut written = Vec::with_capacity(files.len());
    for (name, contents) in files {
        let path = out_dir.join(name);
        fs::write(&path, contents)
            .map_err(|e| AppError::output(format!("Failed to write report '{}': {e}", path.display())))?;
        debug!(path = %path.display(), "wrote report");
        written.push(path);
    }

    info!(dir = %out_dir.display(), files = written.len(), "reports written");
    Ok(written)
}

/// Write the costed daily series to a CSV file with a header row.
pub fn write_daily_csv(path: &Path, daily: &[CostedReading]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for r in daily {
        writer
            .serialize(DailyCsvRow::from(r))
            .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to write export CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = daily.len(), "daily CSV exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::build_views;
    use crate::aggregate::test_support::series;
    use crate::error::EXIT_OUTPUT;

    #[test]
    fn writes_one_file_per_view_and_year() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("reports");
        let daily = series(NaiveDate::from_ymd_opt(2022, 12, 20).unwrap(), 20);
        let config = ViewConfig::default();
        let views = build_views(&daily, &config);

        let written = write_reports(&dir, &daily, &views, &config).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "daily.txt",
                "weekly.txt",
                "weekday.txt",
                "monthly.txt",
                "year-2022.txt",
                "year-2023.txt",
                "smoothed.txt"
            ]
        );

        let daily_txt = fs::read_to_string(dir.join("daily.txt")).unwrap();
        assert_eq!(daily_txt.lines().filter(|l| !l.starts_with('#')).count(), 20);
    }

    #[test]
    fn csv_has_header_and_one_row_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        let daily = series(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(), 4);

        write_daily_csv(&path, &daily).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("date,gas_meter,elec_meter,interpolated"));
        assert!(header.ends_with("total_cost"));
        assert_eq!(lines.count(), 4);
    }

    #[test]
    fn unwritable_directory_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let daily = series(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(), 2);
        let config = ViewConfig::default();
        let views = build_views(&daily, &config);
        let err = write_reports(&blocker.join("out"), &daily, &views, &config).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_OUTPUT);
    }
}
