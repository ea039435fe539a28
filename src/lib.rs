//! `meter-ledger` library crate.
//!
//! The binary (`meter`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline stages (tariffs, readings, interpolation, costing, views)
//!   are reusable on their own

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod series;
pub mod tariff;
