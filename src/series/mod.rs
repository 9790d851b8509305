//! Rolling time series storage.
//!
//! Every configured metric owns one [`Series`]: a fixed-capacity ring buffer
//! of `(timestamp, value)` samples. The [`SeriesStore`] owns all of them and
//! is only ever mutated by the coordinating loop.

mod ring;
mod store;

pub use ring::Series;
pub use store::{SeriesStatus, SeriesStore};

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Wall-clock instant attached to a sample.
pub type Timestamp = DateTime<Utc>;

/// A single observation of a metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Identifies a series by the position of its endpoint and metric in the
/// loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesId {
    pub endpoint: usize,
    pub metric: usize,
}

impl SeriesId {
    pub fn new(endpoint: usize, metric: usize) -> Self {
        Self { endpoint, metric }
    }
}

impl std::fmt::Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.endpoint, self.metric)
    }
}

/// How plotted values are derived from the stored raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeriveMode {
    /// Plot the value as fetched.
    #[default]
    Raw,
    /// Change per second between consecutive samples.
    Rate,
    /// Change between consecutive samples.
    Delta,
}

impl DeriveMode {
    pub fn name(&self) -> &'static str {
        match self {
            DeriveMode::Raw => "raw",
            DeriveMode::Rate => "rate",
            DeriveMode::Delta => "delta",
        }
    }
}

/// A sample whose timestamp does not advance past the newest stored sample.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingError {
    pub series: SeriesId,
    pub last: Timestamp,
    pub rejected: Timestamp,
}

impl std::fmt::Display for OrderingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "out-of-order sample for series {}: {} is not after {}",
            self.series,
            self.rejected.to_rfc3339(),
            self.last.to_rfc3339()
        )
    }
}

impl std::error::Error for OrderingError {}
