pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod pdb;
pub mod pipeline;
pub mod xlsx;

pub use cache::{AggregateStore, FileCache};
pub use config::Config;
pub use error::{Result, StatsError};
pub use model::*;
pub use pipeline::{IngestReport, Pipeline, RunSummary, YearOutcome};
