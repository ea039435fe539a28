//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - tariff records and the rates applied to a day (`TariffRecord`, `AppliedRates`)
//! - the reading stages (`RawReading`, `InterpolatedReading`, `CostedReading`)
//! - run configuration (`RunConfig` and its parts)

pub mod types;

pub use types::*;
