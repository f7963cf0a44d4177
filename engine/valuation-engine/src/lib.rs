//! Weekly Valuation Engine
//!
//! Turns per-player weekly statistics and DFS salary movement into a weekly
//! valuation signal: fantasy points, usage and efficiency scores, a market-value
//! label, a multi-week salary/performance correlation and salary trend buckets.
//!
//! The engine owns no I/O. Stats, salaries and computed valuations are reached
//! through the collaborator traits in [`store`], injected at construction time.

pub mod classifier;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod memory;
pub mod models;
pub mod report;
pub mod scoring;
pub mod store;
pub mod trend;


pub use classifier::ValueClassifier;
pub use config::ValuationConfig;
pub use correlation::CorrelationAnalyzer;
pub use engine::WeeklyAnalysisEngine;
pub use error::{Result, ValuationError};
pub use memory::MemoryStore;
pub use models::*;
pub use scoring::ScoringFunctions;
pub use store::{AnalysisStore, IngestStore, SalarySource, StatsSource};
pub use trend::TrendClassifier;
