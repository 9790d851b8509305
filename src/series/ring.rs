//! Fixed-capacity sample ring buffer.

use std::collections::VecDeque;

use super::{Sample, Timestamp};

/// Ring buffer of samples with strictly increasing timestamps.
///
/// Once `capacity` samples are stored, every push evicts the oldest one.
#[derive(Debug, Clone)]
pub struct Series {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Series {
    /// Creates an empty series. A zero capacity is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, returning the evicted sample if the buffer was full.
    ///
    /// Fails with the timestamp of the newest stored sample when `sample`
    /// does not come strictly after it; the buffer is left untouched.
    pub fn push(&mut self, sample: Sample) -> Result<Option<Sample>, Timestamp> {
        if let Some(last) = self.samples.back()
            && sample.timestamp <= last.timestamp
        {
            return Err(last.timestamp);
        }
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        Ok(evicted)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest sample, if any.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Iterates samples from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
