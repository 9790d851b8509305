//! End-to-end dashboard scenarios: fetch workers, store, layout and
//! rendering wired together against mock sources and a test terminal.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use serde_json::json;

use sparkmon::config::{Config, EndpointConfig, SourceKind};
use sparkmon::fetcher::mock::MockSource;
use sparkmon::fetcher::{FetchError, Source, extract_readings};
use sparkmon::series::{DeriveMode, SeriesId, SeriesStore};
use sparkmon::tui::{App, AppState, Event, render};

fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buf = terminal.backend().buffer();
    (0..buf.area.height)
        .map(|y| {
            (0..buf.area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect()
        })
        .collect()
}

#[test]
fn test_rate_of_heap_counter() {
    let config = Config::from_json(
        r#"{"endpoints": [{"url": "http://localhost:8080/debug/vars",
            "metrics": [{"path": "heap", "mode": "rate"}]}]}"#,
    )
    .unwrap();
    let endpoint = &config.endpoints[0];
    let id = SeriesId::new(0, 0);
    let mut store = SeriesStore::new(100);

    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let t1 = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
    for (doc, at) in [(json!({"heap": 100}), t0), (json!({"heap": 150}), t1)] {
        for reading in extract_readings(endpoint, &doc, at) {
            store.append(id, reading.result.unwrap()).unwrap();
        }
    }

    let derived = store.derive(id, DeriveMode::Rate);
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0].value, 50.0);
    assert_eq!(derived[0].timestamp, t1);

    // Same timestamp again: rejected, series unchanged.
    let again = extract_readings(endpoint, &json!({"heap": 175}), t1);
    assert!(store.append(id, again[0].result.clone().unwrap()).is_err());
    assert_eq!(store.snapshot(id).len(), 2);
}

#[test]
fn test_failing_endpoint_does_not_block_the_other() {
    let config = Config::from_json(
        r#"{"endpoints": [
            {"url": "http://up.test/vars", "interval_secs": 0.01, "metrics": [{"path": "heap"}]},
            {"url": "http://down.test/vars", "interval_secs": 0.01, "metrics": [{"path": "conns"}]}
        ]}"#,
    )
    .unwrap();
    let mut app = App::new(config, 64, Duration::from_millis(250));

    let open = |endpoint: &EndpointConfig| -> Result<Box<dyn Source>, FetchError> {
        match &endpoint.source {
            SourceKind::Http(url) if url.contains("down") => {
                Ok(Box::new(MockSource::failing(FetchError::Timeout)))
            }
            _ => Ok(Box::new(
                MockSource::new([
                    Ok(json!({"heap": 1000})),
                    Ok(json!({"heap": 2000})),
                    Ok(json!({"heap": 1500})),
                ])
                .repeat_last(),
            )),
        }
    };

    let (worker_tx, worker_rx) = mpsc::channel();
    app.start_workers(&worker_tx, open).unwrap();

    // Gather a few outcomes of each endpoint from the real worker threads.
    let mut collected = Vec::new();
    let mut per_endpoint = [0usize; 2];
    let deadline = Instant::now() + Duration::from_secs(10);
    while per_endpoint.iter().any(|&n| n < 4) && Instant::now() < deadline {
        if let Ok(Event::Fetch(outcome)) = worker_rx.recv_timeout(Duration::from_millis(100)) {
            per_endpoint[outcome.endpoint] += 1;
            collected.push(Event::Fetch(outcome));
        }
    }
    app.stop_workers();
    assert!(per_endpoint.iter().all(|&n| n >= 4), "outcomes: {:?}", per_endpoint);

    let (tx, rx) = mpsc::channel();
    for event in collected {
        tx.send(event).unwrap();
    }
    tx.send(Event::Tick).unwrap();
    tx.send(Event::Signal).unwrap();

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    app.run_loop(&mut terminal, &rx).unwrap();

    let state = app.state();
    let up = SeriesId::new(0, 0);
    let down = SeriesId::new(1, 0);
    assert!(state.store.snapshot(up).len() >= 4);
    assert_eq!(state.store.latest(up, DeriveMode::Raw), Some(1500.0));
    assert!(!state.store.status(up).unwrap().is_failing());
    assert!(state.store.snapshot(down).is_empty());
    assert_eq!(
        state.store.status(down).unwrap().last_error.as_deref(),
        Some("timed out")
    );
    assert_eq!(state.endpoint_health(), (1, 2));

    let lines = screen(&terminal);
    assert!(lines[0].contains("1/2 endpoints ok"));
    let text = lines.join("\n");
    assert!(text.contains("ERR conns: timed out"));
    assert!(!text.contains("ERR heap"));
    assert!(text.contains("1.5k"));
}

#[test]
fn test_resize_drops_panels_without_crashing() {
    let fields: Vec<String> = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let config = Config::from_fields("http://localhost:8080/debug/vars", &fields).unwrap();
    let mut state = AppState::new(config, 80);

    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    terminal.draw(|frame| render(frame, &mut state)).unwrap();
    assert_eq!(state.layout().panels.len(), 6);
    assert_eq!(state.layout().overflow, 0);

    terminal.backend_mut().resize(40, 10);
    terminal.draw(|frame| render(frame, &mut state)).unwrap();
    let layout = state.layout();
    assert!(layout.panels.len() < 6);
    assert_eq!(layout.panels.len() + layout.overflow, 6);
    for panel in &layout.panels {
        assert!(panel.area.right() <= 40 && panel.area.bottom() <= 10);
    }
    let lines = screen(&terminal);
    assert!(lines[0].contains(&format!("+{} hidden", layout.overflow)));

    // And back: everything fits again.
    terminal.backend_mut().resize(80, 24);
    terminal.draw(|frame| render(frame, &mut state)).unwrap();
    assert_eq!(state.layout().panels.len(), 6);
}

#[test]
fn test_slow_endpoint_does_not_delay_others() {
    let config = Config::from_json(
        r#"{"endpoints": [
            {"url": "http://slow.test/vars", "interval_secs": 0.01, "metrics": [{"path": "heap"}]},
            {"url": "http://fast.test/vars", "interval_secs": 0.01, "metrics": [{"path": "conns"}]}
        ]}"#,
    )
    .unwrap();
    let mut app = App::new(config, 64, Duration::from_millis(250));

    let open = |endpoint: &EndpointConfig| -> Result<Box<dyn Source>, FetchError> {
        match &endpoint.source {
            SourceKind::Http(url) if url.contains("slow") => Ok(Box::new(
                MockSource::new([Ok(json!({"heap": 1}))])
                    .repeat_last()
                    .with_delay(Duration::from_secs(5)),
            )),
            _ => Ok(Box::new(
                MockSource::new([Ok(json!({"conns": 7}))]).repeat_last(),
            )),
        }
    };

    let (worker_tx, worker_rx) = mpsc::channel();
    let started = Instant::now();
    app.start_workers(&worker_tx, open).unwrap();

    let (tx, rx) = mpsc::channel();
    let mut per_endpoint = [0usize; 2];
    while per_endpoint[1] < 5 && started.elapsed() < Duration::from_secs(4) {
        if let Ok(Event::Fetch(outcome)) = worker_rx.recv_timeout(Duration::from_millis(100)) {
            per_endpoint[outcome.endpoint] += 1;
            tx.send(Event::Fetch(outcome)).unwrap();
        }
    }
    app.stop_workers();

    // The fast endpoint delivered repeatedly while the slow fetch was pending.
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(per_endpoint, [0, 5]);

    tx.send(Event::Tick).unwrap();
    tx.send(Event::Signal).unwrap();
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    app.run_loop(&mut terminal, &rx).unwrap();

    let state = app.state();
    assert_eq!(state.store.snapshot(SeriesId::new(1, 0)).len(), 5);
    assert!(state.store.snapshot(SeriesId::new(0, 0)).is_empty());
    let text = screen(&terminal).join("\n");
    assert!(text.contains("heap: waiting for data"));
}
