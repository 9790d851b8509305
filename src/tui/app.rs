//! Main TUI application: the coordinating loop.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, info, warn};

use crate::config::{Config, EndpointConfig};
use crate::fetcher::{FetchError, Source, WorkerPool, open_source};

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::{AppState, RunState};
use super::terminal::{TerminalError, TerminalGuard};

/// Fatal dashboard failure.
#[derive(Debug)]
pub enum AppError {
    /// Terminal could not be set up.
    Terminal(TerminalError),
    /// Drawing failed.
    Io(io::Error),
    /// A source could not be opened.
    Source { endpoint: String, error: FetchError },
    /// A worker thread could not be started.
    Spawn(io::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Terminal(e) => write!(f, "{}", e),
            AppError::Io(e) => write!(f, "terminal I/O error: {}", e),
            AppError::Source { endpoint, error } => {
                write!(f, "cannot open source {}: {}", endpoint, error)
            }
            AppError::Spawn(e) => write!(f, "cannot start fetch worker: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<TerminalError> for AppError {
    fn from(e: TerminalError) -> Self {
        AppError::Terminal(e)
    }
}

/// Main TUI application.
pub struct App {
    state: AppState,
    pool: WorkerPool,
    refresh: Duration,
}

impl App {
    /// Creates the dashboard keeping `capacity` samples per series and
    /// redrawing every `refresh`.
    pub fn new(config: Config, capacity: usize, refresh: Duration) -> Self {
        Self {
            state: AppState::new(config, capacity),
            pool: WorkerPool::new(),
            refresh,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Starts one fetch worker per endpoint, delivering into `tx`.
    pub fn start_workers<F>(&mut self, tx: &Sender<Event>, open: F) -> Result<(), AppError>
    where
        F: Fn(&EndpointConfig) -> Result<Box<dyn Source>, FetchError>,
    {
        for (index, endpoint) in self.state.config.endpoints.iter().enumerate() {
            let source = open(endpoint).map_err(|error| AppError::Source {
                endpoint: endpoint.source.to_string(),
                error,
            })?;
            let tx = tx.clone();
            self.pool
                .spawn(index, endpoint.clone(), source, move |outcome| {
                    tx.send(Event::Fetch(outcome)).is_ok()
                })
                .map_err(AppError::Spawn)?;
        }
        info!(
            workers = self.pool.len(),
            capacity = self.state.store.capacity(),
            "fetch workers started"
        );
        Ok(())
    }

    /// Signals every fetch worker to stop.
    pub fn stop_workers(&mut self) {
        self.pool.shutdown();
    }

    /// Runs the dashboard on the real terminal until quit or a signal.
    pub fn run(mut self) -> Result<(), AppError> {
        let mut guard = TerminalGuard::acquire()?;
        let events = EventHandler::new(self.refresh);

        let signal_tx = events.sender();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = signal_tx.send(Event::Signal);
        }) {
            warn!(error = %e, "signal handler not installed");
        }

        self.start_workers(&events.sender(), open_source)?;
        let result = self.run_loop(guard.terminal_mut(), events.receiver());

        self.stop_workers();
        drop(guard);
        info!("dashboard stopped");
        result.map_err(AppError::Io)
    }

    /// Consumes events until the state becomes terminating or every
    /// producer is gone.
    pub fn run_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        events: &Receiver<Event>,
    ) -> io::Result<()> {
        terminal.draw(|frame| render(frame, &mut self.state))?;

        while let Ok(event) = events.recv() {
            let redraw = match event {
                Event::Tick => self.state.run_state == RunState::Running,
                Event::Key(key) => match handle_key(&mut self.state, key) {
                    KeyAction::Quit => {
                        self.state.terminate();
                        false
                    }
                    KeyAction::Redraw => true,
                    KeyAction::None => false,
                },
                Event::Resize(width, height) => {
                    debug!(width, height, "terminal resized");
                    true
                }
                Event::Fetch(outcome) => {
                    self.state.apply_outcome(outcome);
                    false
                }
                Event::Signal => {
                    info!("termination signal received");
                    self.state.terminate();
                    false
                }
            };

            if self.state.is_terminating() {
                break;
            }
            if redraw {
                terminal.draw(|frame| render(frame, &mut self.state))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchOutcome, Reading};
    use crate::series::{DeriveMode, Sample, SeriesId};
    use chrono::{TimeZone, Utc};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn app() -> App {
        let config = Config::from_fields("http://localhost:8080/debug/vars", &["heap".to_string()])
            .unwrap();
        App::new(config, 32, Duration::from_millis(250))
    }

    fn fetch(secs: i64, value: f64) -> Event {
        let at = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        Event::Fetch(FetchOutcome {
            endpoint: 0,
            fetched_at: at,
            result: Ok(vec![Reading {
                metric: 0,
                result: Ok(Sample::new(at, value)),
            }]),
        })
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buf = terminal.backend().buffer();
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_loop_ingests_and_quits() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let (tx, rx) = mpsc::channel();
        tx.send(fetch(0, 1.0)).unwrap();
        tx.send(fetch(1, 2.0)).unwrap();
        tx.send(Event::Tick).unwrap();
        tx.send(key('q')).unwrap();
        tx.send(fetch(2, 3.0)).unwrap();

        app.run_loop(&mut terminal, &rx).unwrap();

        let id = SeriesId::new(0, 0);
        assert!(app.state().is_terminating());
        // The outcome queued after quit is never applied.
        assert_eq!(app.state().store.snapshot(id).len(), 2);
        assert_eq!(app.state().store.latest(id, DeriveMode::Raw), Some(2.0));
        assert!(row(&terminal, 0).contains("LIVE"));
    }

    #[test]
    fn test_pause_stops_drawing_but_not_ingestion() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let (tx, rx) = mpsc::channel();
        tx.send(key('p')).unwrap();
        tx.send(fetch(0, 1.0)).unwrap();
        tx.send(fetch(1, 2.0)).unwrap();
        tx.send(Event::Tick).unwrap();
        tx.send(Event::Signal).unwrap();

        app.run_loop(&mut terminal, &rx).unwrap();

        assert_eq!(app.state().store.snapshot(SeriesId::new(0, 0)).len(), 2);
        // Last frame is the one drawn on pausing: no values yet.
        assert!(row(&terminal, 0).contains("PAUSED"));
        assert!(!row(&terminal, 1).contains('2'));
    }

    #[test]
    fn test_loop_ends_when_producers_are_gone() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let (tx, rx) = mpsc::channel();
        tx.send(fetch(0, 1.0)).unwrap();
        drop(tx);

        app.run_loop(&mut terminal, &rx).unwrap();
        assert!(!app.state().is_terminating());
        assert_eq!(app.state().store.snapshot(SeriesId::new(0, 0)).len(), 1);
    }
}
