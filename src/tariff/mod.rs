//! Effective-dated tariff schedule.
//!
//! A schedule holds rate records sorted by `effective_date`, unique per date.
//! A record applies from its date until the next record takes over, so the
//! rate for a day is the most recent record not later than that day.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{AppliedRates, TariffRecord};
use crate::error::AppError;
use crate::io::ingest::{LineError, read_dated_file};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TariffSchedule {
    records: Vec<TariffRecord>,
}

/// A schedule loaded from disk plus the lines that were skipped.
#[derive(Debug, Clone)]
pub struct LoadedSchedule {
    pub schedule: TariffSchedule,
    pub line_errors: Vec<LineError>,
    pub lines_read: usize,
}

impl TariffSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// A schedule with a single initial record.
    pub fn with_rate(
        gas_standing: f64,
        gas_unit: f64,
        elec_standing: f64,
        elec_unit: f64,
        effective_date: NaiveDate,
    ) -> Self {
        let mut schedule = Self::new();
        schedule.add_rate(gas_standing, gas_unit, elec_standing, elec_unit, effective_date);
        schedule
    }

    /// Insert a record, keeping the schedule sorted by effective date.
    ///
    /// A record for an already-present date replaces it; the replaced record
    /// is returned.
    pub fn add_rate(
        &mut self,
        gas_standing: f64,
        gas_unit: f64,
        elec_standing: f64,
        elec_unit: f64,
        effective_date: NaiveDate,
    ) -> Option<TariffRecord> {
        self.insert(TariffRecord {
            effective_date,
            gas_standing_charge: gas_standing,
            gas_unit_rate: gas_unit,
            elec_standing_charge: elec_standing,
            elec_unit_rate: elec_unit,
        })
    }

    pub fn insert(&mut self, record: TariffRecord) -> Option<TariffRecord> {
        let pos = self
            .records
            .partition_point(|r| r.effective_date < record.effective_date);
        match self.records.get_mut(pos) {
            Some(existing) if existing.effective_date == record.effective_date => {
                warn!(
                    date = %record.effective_date,
                    "duplicate tariff date; later record replaces the earlier one"
                );
                Some(std::mem::replace(existing, record))
            }
            _ => {
                self.records.insert(pos, record);
                None
            }
        }
    }

    /// The record in force on `date`: the latest one whose effective date is
    /// not after `date`.
    ///
    /// Scans from the most recent record backwards; schedules hold a few
    /// dozen entries at most.
    pub fn rate_at(&self, date: NaiveDate) -> Option<&TariffRecord> {
        self.records.iter().rev().find(|r| r.effective_date <= date)
    }

    /// The four rate fields for `date`, all zero when no record applies.
    pub fn applied_rates(&self, date: NaiveDate) -> AppliedRates {
        self.rate_at(date).map(AppliedRates::from).unwrap_or_default()
    }

    pub fn records(&self) -> &[TariffRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last effective dates.
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((
            self.records.first()?.effective_date,
            self.records.last()?.effective_date,
        ))
    }

    /// Load a tariff file.
    ///
    /// Each line: `dd/mm/yyyy gas_standing gas_unit elec_standing elec_unit`.
    /// A missing file is an error; malformed lines and lines with negative
    /// rates are skipped.
    pub fn load(path: &Path) -> Result<LoadedSchedule, AppError> {
        let file = read_dated_file::<4>(path, "tariff")?;

        let mut schedule = Self::new();
        let mut line_errors = file.line_errors;

        for row in &file.rows {
            if let Some(pos) = row.values.iter().position(|v| *v < 0.0) {
                let message = format!("negative rate in field {}", pos + 1);
                warn!(file = %path.display(), line = row.line, "skipping tariff line: {message}");
                line_errors.push(LineError {
                    line: row.line,
                    message,
                });
                continue;
            }
            let [gas_standing, gas_unit, elec_standing, elec_unit] = row.values;
            schedule.add_rate(gas_standing, gas_unit, elec_standing, elec_unit, row.date);
        }
        line_errors.sort_by_key(|e| e.line);

        info!(
            file = %path.display(),
            records = schedule.len(),
            skipped = line_errors.len(),
            "loaded tariff schedule"
        );

        Ok(LoadedSchedule {
            schedule,
            line_errors,
            lines_read: file.lines_read,
        })
    }

    /// Load a tariff file, keeping only the schedule.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        Ok(Self::load(path)?.schedule)
    }
}
