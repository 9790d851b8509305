//! Dashboard state owned by the coordinating loop.

use ratatui::layout::Rect;
use tracing::{debug, info, warn};

use crate::config::{Config, PanelSpec};
use crate::fetcher::{FetchError, FetchOutcome};
use crate::layout::{PanelLayout, compute_layout};
use crate::series::{SeriesId, SeriesStore, Timestamp};

/// Lifecycle of the dashboard loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Rendering at the refresh rate.
    #[default]
    Running,
    /// Rendering suspended; polling and sample ingestion continue.
    Paused,
    /// Shutting down; the loop exits after the current event.
    Terminating,
}

impl RunState {
    /// Running ⇄ Paused. Terminating is final.
    pub fn toggle_pause(self) -> Self {
        match self {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Terminating => RunState::Terminating,
        }
    }
}

/// Health of one endpoint as seen by the coordinator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointStatus {
    pub last_success: Option<Timestamp>,
    pub last_error: Option<String>,
    /// The source reported end of input.
    pub closed: bool,
    pub fetches: u64,
    pub failures: u64,
}

impl EndpointStatus {
    pub fn is_healthy(&self) -> bool {
        self.last_error.is_none() && !self.closed
    }
}

/// All mutable dashboard state. Only the coordinating loop touches it.
pub struct AppState {
    pub config: Config,
    pub panels: Vec<PanelSpec>,
    pub store: SeriesStore,
    pub endpoints: Vec<EndpointStatus>,
    pub run_state: RunState,
    pub show_help: bool,
    layout: PanelLayout,
    layout_area: Option<Rect>,
}

impl AppState {
    /// Creates the state for `config`, keeping `capacity` samples per series.
    pub fn new(config: Config, capacity: usize) -> Self {
        let panels = config.panels();
        let endpoints = vec![EndpointStatus::default(); config.endpoints.len()];
        Self {
            config,
            panels,
            store: SeriesStore::new(capacity),
            endpoints,
            run_state: RunState::Running,
            show_help: false,
            layout: PanelLayout::default(),
            layout_area: None,
        }
    }

    /// Feeds one fetch result into the series store.
    ///
    /// Failures are isolated: a fetch error marks only the series of that
    /// endpoint, an extraction error only its own series.
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        let index = outcome.endpoint;
        let (Some(endpoint), Some(status)) = (
            self.config.endpoints.get(index),
            self.endpoints.get_mut(index),
        ) else {
            warn!(endpoint = index, "fetch outcome for unknown endpoint");
            return;
        };
        status.fetches += 1;

        match outcome.result {
            Ok(readings) => {
                if status.last_error.take().is_some() {
                    info!(endpoint = %endpoint.source, "endpoint recovered");
                }
                status.last_success = Some(outcome.fetched_at);
                for reading in readings {
                    let id = SeriesId::new(index, reading.metric);
                    match reading.result {
                        // Ordering errors are logged and recorded by the store.
                        Ok(sample) => {
                            let _ = self.store.append(id, sample);
                        }
                        Err(e) => {
                            debug!(series = %id, error = %e, "no sample this tick");
                            self.store.record_error(id, e.to_string());
                        }
                    }
                }
            }
            Err(e) => {
                if e == FetchError::Closed {
                    info!(endpoint = %endpoint.source, "source closed");
                    status.closed = true;
                } else {
                    status.failures += 1;
                    if status.last_error.is_none() {
                        warn!(endpoint = %endpoint.source, error = %e, "fetch failed");
                    } else {
                        debug!(endpoint = %endpoint.source, error = %e, "fetch failed");
                    }
                }
                status.last_error = Some(e.to_string());
                for metric in 0..endpoint.metrics.len() {
                    self.store
                        .record_error(SeriesId::new(index, metric), e.to_string());
                }
            }
        }
    }

    /// Recomputes the panel layout if `area` changed since the last call.
    pub fn ensure_layout(&mut self, area: Rect) {
        if self.layout_area == Some(area) {
            return;
        }
        self.layout = compute_layout(area.width, area.height, &self.panels).offset(area.x, area.y);
        self.layout_area = Some(area);
        if self.layout.is_overflowing() {
            warn!(
                width = area.width,
                height = area.height,
                hidden = self.layout.overflow,
                "terminal too small for all panels"
            );
        } else {
            debug!(width = area.width, height = area.height, "layout recomputed");
        }
    }

    /// Layout computed by the last [`AppState::ensure_layout`] call.
    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn toggle_pause(&mut self) {
        self.run_state = self.run_state.toggle_pause();
        info!(state = ?self.run_state, "pause toggled");
    }

    pub fn terminate(&mut self) {
        self.run_state = RunState::Terminating;
    }

    pub fn is_terminating(&self) -> bool {
        self.run_state == RunState::Terminating
    }

    /// `(healthy, total)` endpoint counts.
    pub fn endpoint_health(&self) -> (usize, usize) {
        let healthy = self.endpoints.iter().filter(|e| e.is_healthy()).count();
        (healthy, self.endpoints.len())
    }
}
