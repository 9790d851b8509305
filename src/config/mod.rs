//! Dashboard configuration.
//!
//! Endpoints and metrics come from a JSON file (`--config`), from
//! command-line field specs, or both. Everything is validated up front into
//! immutable [`Config`] values; any problem is a [`ConfigError`] and stops
//! the process before the terminal is touched.

mod field_spec;

pub use field_spec::{FieldGroup, parse_field_spec, parse_field_specs};

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use ratatui::style::Color;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;

use crate::fetcher::{FieldPath, PathSyntaxError};
use crate::series::{DeriveMode, SeriesId};

/// Poll interval used when neither the file nor the flags set one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Hard deadline for one fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Redraw period (4 Hz).
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(250);
/// Source name that reads newline-delimited JSON documents from stdin.
pub const STDIN_SOURCE: &str = "-";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file could not be read.
    Io { path: String, message: String },
    /// Config file is not valid JSON or does not match the schema.
    Parse { path: String, message: String },
    /// Nothing to monitor.
    NoEndpoints,
    /// Endpoint without metrics.
    NoMetrics { endpoint: String },
    /// Endpoint URL is neither `-` nor an http(s) URL.
    InvalidUrl { url: String, message: String },
    /// Field path does not parse.
    InvalidPath(PathSyntaxError),
    /// Command-line field spec is malformed.
    InvalidField { spec: String, message: String },
    /// Color name not understood.
    InvalidColor { label: String, color: String },
    /// Interval, timeout or refresh is not a positive number of seconds.
    InvalidDuration { what: &'static str, value: f64 },
    /// Fixed scale with `min >= max`.
    InvalidScale { label: String, min: f64, max: f64 },
    /// Both basic auth and a bearer token on one endpoint.
    ConflictingAuth { endpoint: String },
    /// More than one endpoint reads stdin.
    MultipleStdin,
    /// Stdin source while stdin is the terminal the dashboard reads keys from.
    StdinIsTerminal,
    /// Header name or value that cannot be sent.
    InvalidHeader {
        endpoint: String,
        name: String,
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "cannot read {}: {}", path, message),
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config {}: {}", path, message)
            }
            ConfigError::NoEndpoints => {
                write!(f, "no endpoints configured (use --config or field arguments)")
            }
            ConfigError::NoMetrics { endpoint } => {
                write!(f, "endpoint {} has no metrics", endpoint)
            }
            ConfigError::InvalidUrl { url, message } => {
                write!(f, "invalid endpoint url '{}': {}", url, message)
            }
            ConfigError::InvalidPath(e) => write!(f, "{}", e),
            ConfigError::InvalidField { spec, message } => {
                write!(f, "invalid field '{}': {}", spec, message)
            }
            ConfigError::InvalidColor { label, color } => {
                write!(f, "metric {}: unknown color '{}'", label, color)
            }
            ConfigError::InvalidDuration { what, value } => {
                write!(f, "{} must be a positive number of seconds, got {}", what, value)
            }
            ConfigError::InvalidScale { label, min, max } => {
                write!(f, "metric {}: min {} must be below max {}", label, min, max)
            }
            ConfigError::ConflictingAuth { endpoint } => write!(
                f,
                "endpoint {}: basic_auth and bearer_token are mutually exclusive",
                endpoint
            ),
            ConfigError::MultipleStdin => write!(f, "only one endpoint can read stdin"),
            ConfigError::StdinIsTerminal => write!(
                f,
                "stdin is a terminal: pipe JSON documents into sparkmon or pass --url"
            ),
            ConfigError::InvalidHeader {
                endpoint,
                name,
                message,
            } => write!(f, "endpoint {}: invalid header '{}': {}", endpoint, name, message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<PathSyntaxError> for ConfigError {
    fn from(e: PathSyntaxError) -> Self {
        ConfigError::InvalidPath(e)
    }
}

/// Credentials sent with every request to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Basic(BasicAuth),
    Bearer(String),
}

/// Where an endpoint's documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Http(String),
    Stdin,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Http(url) => f.write_str(url),
            SourceKind::Stdin => f.write_str("stdin"),
        }
    }
}

/// Optional fixed vertical scale of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scale {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One plotted field of an endpoint's documents.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub path: FieldPath,
    pub label: String,
    pub mode: DeriveMode,
    pub color: Option<Color>,
    pub unit: Option<String>,
    pub scale: Scale,
    /// Metrics sharing a panel name are drawn in the same panel.
    pub panel: Option<String>,
    /// Marker metrics highlight the columns where they are non-zero.
    pub marker: bool,
}

impl MetricSpec {
    /// Raw-mode metric labelled by its path.
    pub fn new(path: FieldPath) -> Self {
        Self {
            label: path.as_str().to_string(),
            path,
            mode: DeriveMode::Raw,
            color: None,
            unit: None,
            scale: Scale::default(),
            panel: None,
            marker: false,
        }
    }

    pub fn with_mode(mut self, mode: DeriveMode) -> Self {
        self.mode = mode;
        self
    }
}

/// A polled source of JSON documents and the metrics read from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub source: SourceKind,
    pub interval: Duration,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
    pub auth: Option<Auth>,
    /// Where to read sample timestamps from instead of the fetch time.
    pub timestamp_path: Option<FieldPath>,
    pub metrics: Vec<MetricSpec>,
}

impl EndpointConfig {
    pub fn new(source: SourceKind, metrics: Vec<MetricSpec>) -> Self {
        Self {
            source,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            auth: None,
            timestamp_path: None,
            metrics,
        }
    }
}

/// What a panel shows: a title and the series drawn in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSpec {
    pub title: String,
    pub series: Vec<SeriesId>,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    endpoints: Vec<RawEndpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEndpoint {
    url: String,
    #[serde(default)]
    interval_secs: Option<f64>,
    #[serde(default)]
    timeout_secs: Option<f64>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    basic_auth: Option<BasicAuth>,
    #[serde(default)]
    bearer_token: Option<String>,
    #[serde(default)]
    timestamp_path: Option<String>,
    metrics: Vec<RawMetric>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMetric {
    path: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    mode: DeriveMode,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    panel: Option<String>,
    #[serde(default)]
    marker: bool,
}

impl Config {
    /// Loads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        let endpoints = raw
            .endpoints
            .into_iter()
            .map(validate_endpoint)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(endpoints)
    }

    /// Builds a config from command-line field specs read from `url`.
    pub fn from_fields(url: &str, fields: &[String]) -> Result<Self, ConfigError> {
        Self::new(vec![endpoint_from_fields(url, fields)?])
    }

    /// Validates cross-endpoint invariants.
    pub fn new(endpoints: Vec<EndpointConfig>) -> Result<Self, ConfigError> {
        if endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        let stdin_count = endpoints
            .iter()
            .filter(|e| e.source == SourceKind::Stdin)
            .count();
        if stdin_count > 1 {
            return Err(ConfigError::MultipleStdin);
        }
        Ok(Self { endpoints })
    }

    /// Appends the endpoints of `other`.
    pub fn merge(self, other: Config) -> Result<Self, ConfigError> {
        let mut endpoints = self.endpoints;
        endpoints.extend(other.endpoints);
        Self::new(endpoints)
    }

    /// Rejects a stdin source when stdin is the interactive terminal: the
    /// source and the key reader would compete for the same input.
    pub fn check_stdin(&self, stdin_is_terminal: bool) -> Result<(), ConfigError> {
        let reads_stdin = self.endpoints.iter().any(|e| e.source == SourceKind::Stdin);
        if reads_stdin && stdin_is_terminal {
            return Err(ConfigError::StdinIsTerminal);
        }
        Ok(())
    }

    /// Applies command-line overrides to every endpoint.
    pub fn apply_overrides(
        &mut self,
        interval_secs: Option<f64>,
        timeout_secs: Option<f64>,
    ) -> Result<(), ConfigError> {
        let interval = interval_secs
            .map(|v| positive_duration("interval", v))
            .transpose()?;
        let timeout = timeout_secs
            .map(|v| positive_duration("timeout", v))
            .transpose()?;
        for endpoint in &mut self.endpoints {
            if let Some(interval) = interval {
                endpoint.interval = interval;
            }
            if let Some(timeout) = timeout {
                endpoint.timeout = timeout;
            }
        }
        Ok(())
    }

    /// Looks up the metric behind a series id.
    pub fn metric(&self, id: SeriesId) -> Option<&MetricSpec> {
        self.endpoints.get(id.endpoint)?.metrics.get(id.metric)
    }

    /// All series ids, in configuration order.
    pub fn series_ids(&self) -> impl Iterator<Item = SeriesId> + '_ {
        self.endpoints.iter().enumerate().flat_map(|(e, endpoint)| {
            (0..endpoint.metrics.len()).map(move |m| SeriesId::new(e, m))
        })
    }

    /// Position of `id` in configuration order, used to pick a default color.
    pub fn ordinal(&self, id: SeriesId) -> Option<usize> {
        self.series_ids().position(|other| other == id)
    }

    /// Groups metrics into panels.
    ///
    /// Metrics with the same `panel` name share one panel, placed where the
    /// first of them appears. Unnamed metrics get a panel each, titled by
    /// their label; a later metric naming that label as its panel joins it.
    pub fn panels(&self) -> Vec<PanelSpec> {
        let mut panels: Vec<PanelSpec> = Vec::new();
        let mut titles: BTreeMap<&str, usize> = BTreeMap::new();
        for id in self.series_ids() {
            let Some(metric) = self.metric(id) else {
                continue;
            };
            match metric.panel.as_deref() {
                Some(name) => {
                    if let Some(&index) = titles.get(name) {
                        panels[index].series.push(id);
                    } else {
                        titles.insert(name, panels.len());
                        panels.push(PanelSpec {
                            title: name.to_string(),
                            series: vec![id],
                        });
                    }
                }
                None => {
                    titles.entry(metric.label.as_str()).or_insert(panels.len());
                    panels.push(PanelSpec {
                        title: metric.label.clone(),
                        series: vec![id],
                    });
                }
            }
        }
        panels
    }
}

/// Parses `"-"` or an http(s) URL.
pub fn parse_source(url: &str) -> Result<SourceKind, ConfigError> {
    if url == STDIN_SOURCE {
        return Ok(SourceKind::Stdin);
    }
    let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(SourceKind::Http(url.to_string())),
        scheme => Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

/// Converts seconds to a `Duration`, rejecting zero, negative and NaN.
pub fn positive_duration(what: &'static str, secs: f64) -> Result<Duration, ConfigError> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(ConfigError::InvalidDuration { what, value: secs });
    }
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDuration { what, value: secs })
}

fn endpoint_from_fields(url: &str, fields: &[String]) -> Result<EndpointConfig, ConfigError> {
    let source = parse_source(url)?;
    let metrics: Vec<MetricSpec> = parse_field_specs(fields)?
        .into_iter()
        .flat_map(FieldGroup::into_metrics)
        .collect();
    if metrics.is_empty() {
        return Err(ConfigError::NoMetrics {
            endpoint: source.to_string(),
        });
    }
    Ok(EndpointConfig::new(source, metrics))
}

fn validate_endpoint(raw: RawEndpoint) -> Result<EndpointConfig, ConfigError> {
    let source = parse_source(&raw.url)?;
    if raw.metrics.is_empty() {
        return Err(ConfigError::NoMetrics { endpoint: raw.url });
    }

    let auth = match (raw.basic_auth, raw.bearer_token) {
        (Some(_), Some(_)) => return Err(ConfigError::ConflictingAuth { endpoint: raw.url }),
        (Some(basic), None) => Some(Auth::Basic(basic)),
        (None, Some(token)) => Some(Auth::Bearer(token)),
        (None, None) => None,
    };

    for (name, value) in &raw.headers {
        let invalid = |message: String| ConfigError::InvalidHeader {
            endpoint: raw.url.clone(),
            name: name.clone(),
            message,
        };
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    }

    let interval = raw
        .interval_secs
        .map(|v| positive_duration("interval", v))
        .transpose()?
        .unwrap_or(DEFAULT_INTERVAL);
    let timeout = raw
        .timeout_secs
        .map(|v| positive_duration("timeout", v))
        .transpose()?
        .unwrap_or(DEFAULT_TIMEOUT);
    let timestamp_path = raw
        .timestamp_path
        .as_deref()
        .map(FieldPath::parse)
        .transpose()?;
    let metrics = raw
        .metrics
        .into_iter()
        .map(validate_metric)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EndpointConfig {
        source,
        interval,
        timeout,
        headers: raw.headers.into_iter().collect(),
        auth,
        timestamp_path,
        metrics,
    })
}

fn validate_metric(raw: RawMetric) -> Result<MetricSpec, ConfigError> {
    let path = FieldPath::parse(&raw.path)?;
    let label = raw.label.unwrap_or_else(|| raw.path.clone());

    let color = raw
        .color
        .map(|c| {
            c.parse::<Color>().map_err(|_| ConfigError::InvalidColor {
                label: label.clone(),
                color: c.clone(),
            })
        })
        .transpose()?;

    if let (Some(min), Some(max)) = (raw.min, raw.max)
        && min >= max
    {
        return Err(ConfigError::InvalidScale { label, min, max });
    }

    Ok(MetricSpec {
        path,
        label,
        mode: raw.mode,
        color,
        unit: raw.unit,
        scale: Scale {
            min: raw.min,
            max: raw.max,
        },
        panel: raw.panel,
        marker: raw.marker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "endpoints": [
            {
                "url": "http://localhost:8080/debug/vars",
                "interval_secs": 2,
                "headers": {"X-Env": "prod"},
                "bearer_token": "secret",
                "metrics": [
                    {"path": "memstats.HeapAlloc", "label": "heap", "color": "cyan", "unit": "B"},
                    {"path": "memstats.NumGC", "mode": "rate", "panel": "gc"},
                    {"path": "memstats.PauseTotalNs", "mode": "delta", "panel": "gc", "min": 0, "max": 100}
                ]
            },
            {
                "url": "https://example.com/metrics",
                "timeout_secs": 0.5,
                "metrics": [{"path": "requests[0]"}]
            }
        ]
    }"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_json(SAMPLE).unwrap();
        assert_eq!(config.endpoints.len(), 2);

        let first = &config.endpoints[0];
        assert_eq!(
            first.source,
            SourceKind::Http("http://localhost:8080/debug/vars".into())
        );
        assert_eq!(first.interval, Duration::from_secs(2));
        assert_eq!(first.timeout, DEFAULT_TIMEOUT);
        assert_eq!(first.headers, vec![("X-Env".into(), "prod".into())]);
        assert_eq!(first.auth, Some(Auth::Bearer("secret".into())));
        assert_eq!(first.metrics[0].label, "heap");
        assert_eq!(first.metrics[0].color, Some(Color::Cyan));
        assert_eq!(first.metrics[1].mode, DeriveMode::Rate);
        assert_eq!(first.metrics[1].label, "memstats.NumGC");
        assert_eq!(first.metrics[2].scale.max, Some(100.0));

        let second = &config.endpoints[1];
        assert_eq!(second.interval, DEFAULT_INTERVAL);
        assert_eq!(second.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_panels_group_by_name() {
        let config = Config::from_json(SAMPLE).unwrap();
        let panels = config.panels();
        let titles: Vec<&str> = panels.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["heap", "gc", "requests[0]"]);
        assert_eq!(
            panels[1].series,
            vec![SeriesId::new(0, 1), SeriesId::new(0, 2)]
        );
        assert_eq!(panels[2].series, vec![SeriesId::new(1, 0)]);
    }

    #[test]
    fn test_named_panel_joins_unnamed_metric_with_that_label() {
        let config = Config::from_json(
            r#"{"endpoints": [
                {"url": "http://a", "metrics": [
                    {"path": "heap", "mode": "rate"},
                    {"path": "gc", "panel": "heap", "marker": true}
                ]},
                {"url": "http://b", "metrics": [{"path": "conns"}, {"path": "conns"}]}
            ]}"#,
        )
        .unwrap();
        let panels = config.panels();
        let titles: Vec<&str> = panels.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["heap", "conns", "conns"]);
        assert_eq!(panels[0].series, vec![SeriesId::new(0, 0), SeriesId::new(0, 1)]);
        // Unnamed metrics never merge with each other.
        assert_eq!(panels[1].series, vec![SeriesId::new(1, 0)]);
        assert_eq!(panels[2].series, vec![SeriesId::new(1, 1)]);
    }

    #[test]
    fn test_stdin_source_needs_piped_input() {
        let stdin = Config::from_fields("-", &["heap".to_string()]).unwrap();
        assert_eq!(stdin.check_stdin(true), Err(ConfigError::StdinIsTerminal));
        assert_eq!(stdin.check_stdin(false), Ok(()));

        let http = Config::from_fields("http://localhost:8080/debug/vars", &["heap".to_string()])
            .unwrap();
        assert_eq!(http.check_stdin(true), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            (r#"{"endpoints": []}"#, "no endpoints"),
            (
                r#"{"endpoints": [{"url": "ftp://x", "metrics": [{"path": "a"}]}]}"#,
                "unsupported scheme",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "metrics": []}]}"#,
                "has no metrics",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "metrics": [{"path": "a..b"}]}]}"#,
                "invalid path",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "metrics": [{"path": "a", "mode": "avg"}]}]}"#,
                "invalid config",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "interval_secs": 0, "metrics": [{"path": "a"}]}]}"#,
                "interval must be a positive",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "metrics": [{"path": "a", "color": "plaid"}]}]}"#,
                "unknown color",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "metrics": [{"path": "a", "min": 5, "max": 5}]}]}"#,
                "must be below max",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "bearer_token": "t", "basic_auth": {"username": "u"}, "metrics": [{"path": "a"}]}]}"#,
                "mutually exclusive",
            ),
            (
                r#"{"endpoints": [{"url": "-", "metrics": [{"path": "a"}]}, {"url": "-", "metrics": [{"path": "b"}]}]}"#,
                "only one endpoint",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "metric": []}]}"#,
                "invalid config",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "headers": {"X Bad": "v"}, "metrics": [{"path": "a"}]}]}"#,
                "invalid header 'X Bad'",
            ),
            (
                r#"{"endpoints": [{"url": "http://x", "headers": {"X-Ok": "line\nbreak"}, "metrics": [{"path": "a"}]}]}"#,
                "invalid header 'X-Ok'",
            ),
        ];
        for (json, expected) in cases {
            let err = Config::from_json(json).unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "{json}: got '{err}', expected '{expected}'"
            );
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.series_ids().count(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/sparkmon.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides_apply_to_all_endpoints() {
        let mut config = Config::from_json(SAMPLE).unwrap();
        config.apply_overrides(Some(0.5), Some(3.0)).unwrap();
        for endpoint in &config.endpoints {
            assert_eq!(endpoint.interval, Duration::from_millis(500));
            assert_eq!(endpoint.timeout, Duration::from_secs(3));
        }
        assert!(config.apply_overrides(Some(-1.0), None).is_err());
    }

    #[test]
    fn test_from_fields_and_merge() {
        let fields = vec!["counter:requests".to_string(), "a+b".to_string()];
        let cli = Config::from_fields("-", &fields).unwrap();
        assert_eq!(cli.endpoints[0].source, SourceKind::Stdin);
        assert_eq!(cli.endpoints[0].metrics.len(), 3);
        assert_eq!(cli.panels().len(), 2);

        let merged = Config::from_json(SAMPLE).unwrap().merge(cli).unwrap();
        assert_eq!(merged.endpoints.len(), 3);
        assert_eq!(merged.metric(SeriesId::new(2, 0)).unwrap().mode, DeriveMode::Delta);
    }
}
