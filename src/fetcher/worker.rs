//! Per-endpoint polling threads.
//!
//! Every endpoint gets a dedicated thread that fetches on its own interval
//! and hands each [`FetchOutcome`] to a delivery callback (in the dashboard,
//! a send on the coordinator's channel). Outcomes of one endpoint are
//! delivered in fetch order. Workers never touch the series store.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EndpointConfig;
use crate::series::{Sample, Timestamp};

use super::{Document, ExtractionError, FetchError, FieldPath, Source};

/// Value read for one metric of an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Index of the metric within its endpoint.
    pub metric: usize,
    pub result: Result<Sample, ExtractionError>,
}

/// Result of one fetch of one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Index of the endpoint in the configuration.
    pub endpoint: usize,
    pub fetched_at: Timestamp,
    pub result: Result<Vec<Reading>, FetchError>,
}

/// Extracts every metric of `endpoint` from `doc`.
///
/// Samples are stamped with `fetched_at`, or with the document's own
/// timestamp when the endpoint has a `timestamp_path`.
pub fn extract_readings(
    endpoint: &EndpointConfig,
    doc: &Document,
    fetched_at: Timestamp,
) -> Vec<Reading> {
    let timestamp = match &endpoint.timestamp_path {
        Some(path) => read_timestamp(path, doc),
        None => Ok(fetched_at),
    };
    endpoint
        .metrics
        .iter()
        .enumerate()
        .map(|(metric, spec)| Reading {
            metric,
            result: timestamp.clone().and_then(|ts| {
                spec.path
                    .extract(doc)
                    .map(|value| Sample::new(ts, value))
            }),
        })
        .collect()
}

/// Reads unix seconds (integer or fractional) or an RFC 3339 string.
fn read_timestamp(path: &FieldPath, doc: &Document) -> Result<Timestamp, ExtractionError> {
    let invalid = |value: String| ExtractionError::InvalidTimestamp {
        path: path.as_str().to_string(),
        value,
    };
    match path.lookup(doc)? {
        Value::Number(n) => {
            let secs = n.as_f64().ok_or_else(|| invalid(n.to_string()))?;
            let micros = (secs * 1_000_000.0).round();
            if !micros.is_finite() || micros.abs() > i64::MAX as f64 {
                return Err(invalid(n.to_string()));
            }
            DateTime::from_timestamp_micros(micros as i64).ok_or_else(|| invalid(n.to_string()))
        }
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| invalid(s.clone())),
        other => Err(ExtractionError::TypeMismatch {
            path: path.as_str().to_string(),
            expected: "timestamp",
            found: super::value_kind(other),
        }),
    }
}

struct Worker {
    endpoint: usize,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

/// Owns the polling threads.
///
/// Dropping the pool (or calling [`WorkerPool::shutdown`]) wakes every
/// sleeping worker and makes it exit. A fetch already in flight runs to
/// completion or to its timeout, and its result is discarded.
#[derive(Default)]
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts polling `source` for the endpoint at `index`.
    ///
    /// `deliver` returns `false` once nobody listens anymore, which stops
    /// the worker.
    pub fn spawn<F>(
        &mut self,
        index: usize,
        endpoint: EndpointConfig,
        source: Box<dyn Source>,
        deliver: F,
    ) -> std::io::Result<()>
    where
        F: Fn(FetchOutcome) -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(format!("fetch-{}", index))
            .spawn(move || run_worker(index, endpoint, source, stop_rx, deliver))?;
        self.workers.push(Worker {
            endpoint: index,
            stop: Some(stop_tx),
            handle: Some(handle),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Signals every worker to stop without waiting for it.
    pub fn shutdown(&mut self) {
        for worker in &mut self.workers {
            if worker.stop.take().is_some() {
                debug!(endpoint = worker.endpoint, "stopping fetch worker");
            }
        }
    }

    /// Stops every worker and waits for the threads to exit.
    ///
    /// Blocks for up to one fetch timeout per busy worker; a worker blocked
    /// on stdin only returns at the next line or end of input.
    pub fn join(mut self) {
        self.shutdown();
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take()
                && handle.join().is_err()
            {
                warn!(endpoint = worker.endpoint, "fetch worker panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn stop_requested(stop: &Receiver<()>) -> bool {
    !matches!(stop.try_recv(), Err(TryRecvError::Empty))
}

fn run_worker<F>(
    index: usize,
    endpoint: EndpointConfig,
    mut source: Box<dyn Source>,
    stop: Receiver<()>,
    deliver: F,
) where
    F: Fn(FetchOutcome) -> bool,
{
    debug!(endpoint = index, source = %endpoint.source, "fetch worker started");
    let periodic = source.is_periodic();
    let mut next_tick = Instant::now();

    loop {
        let result = source.fetch();
        let fetched_at = Utc::now();
        if stop_requested(&stop) {
            break;
        }

        let closed = result == Err(FetchError::Closed);
        if let Err(e) = &result {
            debug!(endpoint = index, error = %e, "fetch failed");
        }
        let outcome = FetchOutcome {
            endpoint: index,
            fetched_at,
            result: result.map(|doc| extract_readings(&endpoint, &doc, fetched_at)),
        };
        if !deliver(outcome) || closed {
            break;
        }

        if periodic {
            next_tick += endpoint.interval;
            let now = Instant::now();
            if next_tick < now {
                // Fetch took longer than the interval: skip missed ticks.
                next_tick = now;
            }
            match stop.recv_timeout(next_tick - now) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
    debug!(endpoint = index, "fetch worker exited");
}
