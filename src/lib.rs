//! Recover two lap speed traces from a lap-detail chart and compute the
//! time gap between them.

pub mod config;
pub mod data;
pub mod fetch;

pub use config::AnalysisConfig;
pub use data::error::{LapError, LapResult};
pub use data::pipeline::{analyze, CancelToken, LapComparison};
