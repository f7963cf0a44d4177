//! # DFS Tracker
//!
//! Service wrapper around the weekly valuation engine: loads each week's stat
//! lines and DFS salaries from the data directory, stores them, runs the
//! weekly analysis and writes a JSON report. Runs once, as a backfill, or on a
//! weekly schedule.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod logging;
pub mod scheduler;
pub mod source;

pub use config::TrackerConfig;
pub use logging::initialize_logging;
pub use scheduler::{BackfillSummary, IngestSummary, TrackerScheduler, UpdateOutcome};
pub use source::JsonFileSource;
