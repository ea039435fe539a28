//! Input/output helpers.
//!
//! - dated-line ingest shared by tariff and reading files (`ingest`)
//! - report files and the daily CSV export (`export`)
//! - JSON run summary (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
