//! JSON run summary.
//!
//! The summary is the machine-readable counterpart of the terminal run
//! summary: input counts, the covered date span, grand totals and the
//! monthly breakdown.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{MonthTotals, Totals};
use crate::app::pipeline::RunOutput;
use crate::domain::CostConfig;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub inputs: InputSummary,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub days: usize,
    pub interpolated_days: usize,
    pub unpriced_days: usize,
    pub pricing: CostConfig,
    pub totals: Totals,
    pub monthly: Vec<MonthSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputSummary {
    pub tariff_file: PathBuf,
    pub tariff_records: usize,
    pub reading_files: Vec<ReadingFileSummary>,
    pub measured_days: usize,
    pub skipped_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingFileSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub skipped_lines: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthSummary {
    /// `YYYY-MM`.
    pub month: String,
    #[serde(flatten)]
    pub totals: Totals,
}

impl From<&MonthTotals> for MonthSummary {
    fn from(m: &MonthTotals) -> Self {
        Self {
            month: format!("{}-{:02}", m.year, m.month),
            totals: m.totals,
        }
    }
}

impl RunSummary {
    pub fn from_output(output: &RunOutput) -> Self {
        let run = &output.run;
        let inputs = &run.inputs;

        Self {
            tool: "meter".to_string(),
            inputs: InputSummary {
                tariff_file: inputs.tariff_path.clone(),
                tariff_records: inputs.schedule().len(),
                reading_files: inputs
                    .files
                    .iter()
                    .map(|f| ReadingFileSummary {
                        path: f.path.clone(),
                        rows: f.rows,
                        skipped_lines: f.line_errors.len(),
                        duplicates: f.duplicates,
                    })
                    .collect(),
                measured_days: inputs.series.len(),
                skipped_lines: inputs.skipped_lines(),
            },
            first_date: run.first_date(),
            last_date: run.last_date(),
            days: run.daily.len(),
            interpolated_days: run.interpolated_days(),
            unpriced_days: run.unpriced_days(),
            pricing: run.costs,
            totals: output.totals,
            monthly: output.views.monthly.iter().map(MonthSummary::from).collect(),
        }
    }
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, output: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    let summary = RunSummary::from_output(output);
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &summary)
        .map_err(|e| AppError::output(format!("Failed to write summary JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to write summary JSON '{}': {e}", path.display())))?;

    info!(path = %path.display(), "summary JSON exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::series;
    use crate::aggregate::{build_views, grand_total};
    use crate::app::pipeline::{CostedRun, Inputs};
    use crate::domain::{InterpolatedReading, RawReading, ViewConfig};
    use crate::series::ReadingSeries;
    use crate::tariff::{LoadedSchedule, TariffSchedule};

    fn output() -> RunOutput {
        let daily = series(NaiveDate::from_ymd_opt(2023, 1, 30).unwrap(), 5);
        let readings = daily
            .iter()
            .map(|r| InterpolatedReading {
                reading: RawReading {
                    date: r.date,
                    gas_meter: r.gas_meter,
                    elec_meter: r.elec_meter,
                },
                interpolated: r.interpolated,
            })
            .collect();
        let view_config = ViewConfig::default();
        let views = build_views(&daily, &view_config);
        let totals = grand_total(&daily);

        RunOutput {
            run: CostedRun {
                inputs: Inputs {
                    tariff_path: PathBuf::from("tariffs.dat"),
                    tariffs: LoadedSchedule {
                        schedule: TariffSchedule::new(),
                        line_errors: Vec::new(),
                        lines_read: 0,
                    },
                    series: ReadingSeries::new(),
                    files: Vec::new(),
                },
                costs: CostConfig::default(),
                readings,
                daily,
            },
            views,
            view_config,
            totals,
        }
    }

    #[test]
    fn summary_json_lists_months_and_totals() {
        let out = output();
        let value = serde_json::to_value(RunSummary::from_output(&out)).unwrap();

        assert_eq!(value["tool"], "meter");
        assert_eq!(value["first_date"], "2023-01-30");
        assert_eq!(value["days"], 5);
        assert_eq!(value["monthly"][0]["month"], "2023-01");
        assert_eq!(value["monthly"][1]["month"], "2023-02");
        assert_eq!(value["monthly"][1]["days"], 3);
        assert!(value["totals"]["total_cost"].is_number());
    }

    #[test]
    fn summary_json_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        write_summary_json(&path, &output()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["days"], 5);
        assert_eq!(value["monthly"].as_array().unwrap().len(), 2);
    }

    // The summary fits in the write buffer, so only the final flush hits the
    // full device.
    #[cfg(target_os = "linux")]
    #[test]
    fn failed_flush_is_an_output_error() {
        let err = write_summary_json(Path::new("/dev/full"), &output()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_OUTPUT);
    }
}
