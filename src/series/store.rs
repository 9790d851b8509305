//! Owner of every metric series and its health status.

use std::collections::BTreeMap;

use tracing::warn;

use super::{DeriveMode, OrderingError, Sample, Series, SeriesId, Timestamp};

/// Health of a single series, independent of whether it holds samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesStatus {
    /// Timestamp of the last accepted sample.
    pub last_success: Option<Timestamp>,
    /// Most recent failure, cleared by the next accepted sample.
    pub last_error: Option<String>,
    /// Failures since the process started.
    pub error_count: u64,
}

impl SeriesStatus {
    pub fn is_failing(&self) -> bool {
        self.last_error.is_some()
    }
}

/// All series of the dashboard.
///
/// Series are created lazily on the first accepted sample and live until
/// the store is dropped. Capacity is shared by all series.
#[derive(Debug)]
pub struct SeriesStore {
    capacity: usize,
    series: BTreeMap<SeriesId, Series>,
    status: BTreeMap<SeriesId, SeriesStatus>,
}

impl SeriesStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: BTreeMap::new(),
            status: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a sample to the series `id`, creating it if needed.
    ///
    /// Samples that do not advance the series timestamp are rejected and
    /// recorded as the series' last error.
    pub fn append(&mut self, id: SeriesId, sample: Sample) -> Result<(), OrderingError> {
        let capacity = self.capacity;
        let series = self
            .series
            .entry(id)
            .or_insert_with(|| Series::with_capacity(capacity));

        match series.push(sample) {
            Ok(_) => {
                let status = self.status.entry(id).or_default();
                status.last_success = Some(sample.timestamp);
                status.last_error = None;
                Ok(())
            }
            Err(last) => {
                let err = OrderingError {
                    series: id,
                    last,
                    rejected: sample.timestamp,
                };
                warn!("{}", err);
                self.record_error(id, err.to_string());
                Err(err)
            }
        }
    }

    /// Marks series `id` as failing without touching its samples.
    pub fn record_error(&mut self, id: SeriesId, message: impl Into<String>) {
        let status = self.status.entry(id).or_default();
        status.last_error = Some(message.into());
        status.error_count += 1;
    }

    /// Ordered copy of the stored raw samples.
    pub fn snapshot(&self, id: SeriesId) -> Vec<Sample> {
        self.series
            .get(&id)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Values to plot for series `id` under `mode`.
    ///
    /// Derived modes produce one point per consecutive pair of samples,
    /// stamped with the later sample; a series with a single sample has no
    /// derived value yet.
    pub fn derive(&self, id: SeriesId, mode: DeriveMode) -> Vec<Sample> {
        let Some(series) = self.series.get(&id) else {
            return Vec::new();
        };
        match mode {
            DeriveMode::Raw => series.iter().copied().collect(),
            DeriveMode::Delta | DeriveMode::Rate => series
                .iter()
                .zip(series.iter().skip(1))
                .filter_map(|(prev, curr)| derive_pair(prev, curr, mode))
                .collect(),
        }
    }

    /// Newest derived value for series `id`.
    pub fn latest(&self, id: SeriesId, mode: DeriveMode) -> Option<f64> {
        let series = self.series.get(&id)?;
        match mode {
            DeriveMode::Raw => series.last().map(|s| s.value),
            DeriveMode::Delta | DeriveMode::Rate => {
                let mut tail = series.iter().rev();
                let curr = tail.next()?;
                let prev = tail.next()?;
                derive_pair(prev, curr, mode).map(|s| s.value)
            }
        }
    }

    pub fn status(&self, id: SeriesId) -> Option<&SeriesStatus> {
        self.status.get(&id)
    }

    pub fn series(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(&id)
    }

    /// Number of series created so far.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Drops all samples; statuses and series identities are kept.
    pub fn clear(&mut self) {
        for series in self.series.values_mut() {
            series.clear();
        }
    }
}

fn derive_pair(prev: &Sample, curr: &Sample, mode: DeriveMode) -> Option<Sample> {
    let delta = curr.value - prev.value;
    let value = match mode {
        DeriveMode::Raw => curr.value,
        DeriveMode::Delta => delta,
        DeriveMode::Rate => {
            let micros = (curr.timestamp - prev.timestamp).num_microseconds()?;
            if micros <= 0 {
                return None;
            }
            delta / (micros as f64 / 1_000_000.0)
        }
    };
    Some(Sample::new(curr.timestamp, value))
}
