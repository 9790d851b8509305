//! Event handling for the dashboard.
//!
//! Terminal input and the render ticker each run on their own thread; fetch
//! workers and the signal handler post into the same channel through
//! [`EventHandler::sender`]. The coordinating loop is the only consumer.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tracing::{debug, warn};

use crate::fetcher::FetchOutcome;

/// How long the input thread blocks in a single poll.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// Render tick.
    Tick,
    /// Keyboard input.
    Key(KeyEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
    /// A fetch worker finished one attempt.
    Fetch(FetchOutcome),
    /// Interrupt or termination signal.
    Signal,
}

/// Event handler that polls terminal input and emits render ticks.
pub struct EventHandler {
    rx: Receiver<Event>,
    tx: Sender<Event>,
}

impl EventHandler {
    /// Creates a handler ticking every `refresh`.
    pub fn new(refresh: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        let input_tx = tx.clone();
        if let Err(e) = thread::Builder::new()
            .name("input".into())
            .spawn(move || input_loop(input_tx))
        {
            warn!(error = %e, "input thread not started");
        }

        let tick_tx = tx.clone();
        if let Err(e) = thread::Builder::new().name("ticker".into()).spawn(move || {
            loop {
                thread::sleep(refresh);
                if tick_tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        }) {
            warn!(error = %e, "ticker thread not started");
        }

        Self { rx, tx }
    }

    /// Sender for producers outside the handler (fetch workers, signals).
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Receiver the coordinating loop drains.
    pub fn receiver(&self) -> &Receiver<Event> {
        &self.rx
    }
}

fn input_loop(tx: Sender<Event>) {
    loop {
        match event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                debug!(error = %e, "terminal input closed");
                break;
            }
        }
        let event = match event::read() {
            // Windows reports both press and release.
            Ok(CrosstermEvent::Key(key)) if key.kind != KeyEventKind::Release => Event::Key(key),
            Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
            Ok(_) => continue,
            Err(e) => {
                debug!(error = %e, "terminal input closed");
                break;
            }
        };
        if tx.send(event).is_err() {
            break;
        }
    }
}
