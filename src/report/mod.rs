//! Reporting utilities: text tables and terminal summaries.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;
