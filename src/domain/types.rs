//! Shared domain types.
//!
//! Readings move through three immutable stages:
//!
//! - `RawReading`: a sample read from a file (or added by hand)
//! - `InterpolatedReading`: a raw sample or a synthetic one filling a gap
//! - `CostedReading`: the daily record with usage, applied rates and costs

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Gas meters count cubic metres; tariffs price kWh.
pub const DEFAULT_GAS_VOLUME_TO_ENERGY_FACTOR: f64 = 10.8237;

/// 5% VAT on domestic energy.
pub const DEFAULT_TAX_FACTOR: f64 = 1.05;

/// Trailing window (records) of the smoothed view.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 30;

/// Rates applying from `effective_date` until superseded by a later record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TariffRecord {
    pub effective_date: NaiveDate,
    /// Daily standing charge, gas.
    pub gas_standing_charge: f64,
    /// Price per kWh of gas.
    pub gas_unit_rate: f64,
    /// Daily standing charge, electricity.
    pub elec_standing_charge: f64,
    /// Price per kWh of electricity.
    pub elec_unit_rate: f64,
}

/// The four rate fields resolved for one day.
///
/// All zero when no tariff record applies (date before the first
/// effective date, or an empty schedule).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AppliedRates {
    pub gas_standing_charge: f64,
    pub gas_unit_rate: f64,
    pub elec_standing_charge: f64,
    pub elec_unit_rate: f64,
    /// Effective date of the record these rates came from.
    pub effective_from: Option<NaiveDate>,
}

impl From<&TariffRecord> for AppliedRates {
    fn from(record: &TariffRecord) -> Self {
        Self {
            gas_standing_charge: record.gas_standing_charge,
            gas_unit_rate: record.gas_unit_rate,
            elec_standing_charge: record.elec_standing_charge,
            elec_unit_rate: record.elec_unit_rate,
            effective_from: Some(record.effective_date),
        }
    }
}

/// A cumulative meter sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub date: NaiveDate,
    pub gas_meter: f64,
    pub elec_meter: f64,
}

/// A reading after gap filling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedReading {
    pub reading: RawReading,
    /// `true` when synthesized between two real readings.
    pub interpolated: bool,
}

impl InterpolatedReading {
    pub fn measured(reading: RawReading) -> Self {
        Self {
            reading,
            interpolated: false,
        }
    }

    pub fn synthetic(reading: RawReading) -> Self {
        Self {
            reading,
            interpolated: true,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.reading.date
    }
}

/// A fully processed day: usage since the previous day, rates and costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostedReading {
    pub date: NaiveDate,
    pub gas_meter: f64,
    pub elec_meter: f64,
    pub interpolated: bool,
    /// Signed; zero for the first record of a series.
    pub gas_used: f64,
    /// Signed; zero for the first record of a series.
    pub elec_used: f64,
    pub rates: AppliedRates,
    pub gas_cost: f64,
    pub elec_cost: f64,
    /// Always `gas_cost + elec_cost`.
    pub total_cost: f64,
}

/// How a second reading for an already-present date is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// The later reading wins (later files override earlier ones).
    #[default]
    Replace,
    /// The first reading wins.
    Keep,
    /// Mean of the existing and incoming meter values.
    Average,
}

/// Pricing constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Multiplier turning metered gas volume into priced energy units.
    pub gas_volume_to_energy_factor: f64,
    /// Uniform multiplicative surcharge on every cost.
    pub tax_factor: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            gas_volume_to_energy_factor: DEFAULT_GAS_VOLUME_TO_ENERGY_FACTOR,
            tax_factor: DEFAULT_TAX_FACTOR,
        }
    }
}

/// Which files feed a run and how they merge.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub tariff_path: PathBuf,
    /// Loaded in order; later files merge into earlier ones.
    pub reading_paths: Vec<PathBuf>,
    pub on_duplicate: DuplicatePolicy,
}

/// Parameters of the derived views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    /// Per-weekday averages only use records strictly after this date.
    pub weekday_since: Option<NaiveDate>,
    pub smoothing_window: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            weekday_since: None,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

/// Where and how results are written.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub out_dir: PathBuf,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_csv: Option<PathBuf>,
    pub export_summary: Option<PathBuf>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus env fallbacks and defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sources: SourceConfig,
    pub costs: CostConfig,
    pub views: ViewConfig,
    pub output: OutputConfig,
}
