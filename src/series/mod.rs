//! Meter reading series and file merging.
//!
//! Readings are keyed by calendar date in an ordered map, so the series is
//! sorted after every insertion and every file. `finalize` hands the sorted
//! readings to the next stage:
//!
//! `ReadingSeries` → `interpolate` → `cost::calculate`

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::{DuplicatePolicy, RawReading};
use crate::error::AppError;
use crate::io::ingest::{LineError, read_dated_file};

pub mod cost;
pub mod interpolate;

/// Meter values for one date.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Meters {
    gas: f64,
    elec: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ReadingSeries {
    readings: BTreeMap<NaiveDate, Meters>,
    policy: DuplicatePolicy,
    duplicates: usize,
}

/// What `add_reading` did with a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Inserted,
    Replaced,
    Kept,
    Averaged,
}

/// Summary of one file merged into a series.
#[derive(Debug, Clone)]
pub struct FileLoad {
    pub path: PathBuf,
    pub lines_read: usize,
    pub rows: usize,
    pub duplicates: usize,
    pub line_errors: Vec<LineError>,
}

impl ReadingSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Add a reading for `date`. Argument order follows the file layout
    /// (electricity first).
    pub fn add_reading(&mut self, date: NaiveDate, elec_value: f64, gas_value: f64) -> Merge {
        let incoming = Meters {
            gas: gas_value,
            elec: elec_value,
        };
        match self.readings.entry(date) {
            Entry::Vacant(slot) => {
                slot.insert(incoming);
                Merge::Inserted
            }
            Entry::Occupied(mut slot) => {
                self.duplicates += 1;
                let merge = match self.policy {
                    DuplicatePolicy::Replace => {
                        slot.insert(incoming);
                        Merge::Replaced
                    }
                    DuplicatePolicy::Keep => Merge::Kept,
                    DuplicatePolicy::Average => {
                        let existing = slot.get_mut();
                        existing.gas = (existing.gas + incoming.gas) / 2.0;
                        existing.elec = (existing.elec + incoming.elec) / 2.0;
                        Merge::Averaged
                    }
                };
                warn!(%date, ?merge, "duplicate reading date");
                merge
            }
        }
    }

    /// Merge a reading file (`dd/mm/yyyy elec gas` per line) into the series.
    ///
    /// Malformed lines are skipped; a missing file is an error.
    pub fn load_from_file(&mut self, path: &Path) -> Result<FileLoad, AppError> {
        let file = read_dated_file::<2>(path, "reading")?;

        let before = self.duplicates;
        for row in &file.rows {
            let [elec, gas] = row.values;
            self.add_reading(row.date, elec, gas);
        }

        let load = FileLoad {
            path: file.path,
            lines_read: file.lines_read,
            rows: file.rows.len(),
            duplicates: self.duplicates - before,
            line_errors: file.line_errors,
        };

        info!(
            file = %path.display(),
            rows = load.rows,
            skipped = load.line_errors.len(),
            duplicates = load.duplicates,
            total = self.len(),
            "merged reading file"
        );

        Ok(load)
    }

    /// Sorted readings, ready for interpolation.
    pub fn finalize(&self) -> Vec<RawReading> {
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = RawReading> + '_ {
        self.readings.iter().map(|(date, m)| RawReading {
            date: *date,
            gas_meter: m.gas,
            elec_meter: m.elec,
        })
    }

    pub fn get(&self, date: NaiveDate) -> Option<RawReading> {
        self.readings.get(&date).map(|m| RawReading {
            date,
            gas_meter: m.gas,
            elec_meter: m.elec,
        })
    }

    /// Position of `date` in the ordered series.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.readings.contains_key(&date) {
            return None;
        }
        Some(self.readings.range(..date).count())
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.readings.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.readings.keys().next_back().copied()
    }

    /// Number of readings that hit an already-present date.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}
