//! Command-line field specs.
//!
//! Each positional argument describes one panel: one or more field paths
//! joined with `+`, each optionally prefixed by comma-separated options and
//! a colon:
//!
//! ```text
//! memstats.HeapAlloc
//! counter:memstats.NumGC+rate:memstats.Mallocs
//! marker,counter:memstats.NumGC+memstats.HeapInuse
//! ```
//!
//! Options: `counter` (delta between samples), `rate` (change per second),
//! `marker` (highlight columns where the value is non-zero).

use crate::fetcher::FieldPath;
use crate::series::DeriveMode;

use super::{ConfigError, MetricSpec};

/// Metrics parsed from one positional argument; they share a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup {
    pub metrics: Vec<MetricSpec>,
}

impl FieldGroup {
    pub fn into_metrics(self) -> Vec<MetricSpec> {
        self.metrics
    }
}

/// Parses every positional field argument.
pub fn parse_field_specs(args: &[String]) -> Result<Vec<FieldGroup>, ConfigError> {
    args.iter().map(|arg| parse_field_spec(arg)).collect()
}

/// Parses one positional field argument.
pub fn parse_field_spec(spec: &str) -> Result<FieldGroup, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidField {
        spec: spec.to_string(),
        message,
    };

    let mut metrics = Vec::new();
    for part in spec.split('+') {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid("empty field".to_string()));
        }
        // Older spelling of "marker,counter:".
        let part = match part.strip_prefix("marker:counter:") {
            Some(rest) => format!("marker,counter:{}", rest),
            None => part.to_string(),
        };

        let (options, name) = split_options(&part);
        let mut mode = DeriveMode::Raw;
        let mut marker = false;
        for option in options {
            match option {
                "counter" | "delta" => mode = DeriveMode::Delta,
                "rate" => mode = DeriveMode::Rate,
                "marker" => marker = true,
                other => return Err(invalid(format!("invalid field option: {}", other))),
            }
        }

        let mut metric = MetricSpec::new(FieldPath::parse(name)?).with_mode(mode);
        metric.marker = marker;
        metrics.push(metric);
    }

    if metrics.len() > 1 {
        let title = metrics
            .iter()
            .map(|m| m.label.as_str())
            .collect::<Vec<_>>()
            .join(" + ");
        for metric in &mut metrics {
            metric.panel = Some(title.clone());
        }
    }

    Ok(FieldGroup { metrics })
}

/// Splits `opt1,opt2:path` into options and path.
///
/// A colon only starts options when everything before it looks like an
/// option list, so quoted keys containing colons still parse as paths.
fn split_options(part: &str) -> (Vec<&str>, &str) {
    if let Some(idx) = part.find(':') {
        let prefix = &part[..idx];
        if !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == ',')
        {
            let options = prefix.split(',').filter(|o| !o.is_empty()).collect();
            return (options, &part[idx + 1..]);
        }
    }
    (Vec::new(), part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_field() {
        let group = parse_field_spec("memstats.HeapAlloc").unwrap();
        assert_eq!(group.metrics.len(), 1);
        let metric = &group.metrics[0];
        assert_eq!(metric.label, "memstats.HeapAlloc");
        assert_eq!(metric.mode, DeriveMode::Raw);
        assert_eq!(metric.panel, None);
        assert!(!metric.marker);
    }

    #[test]
    fn test_options_and_groups() {
        let group = parse_field_spec("marker,counter:gc.num+rate:gc.pause+heap").unwrap();
        let modes: Vec<DeriveMode> = group.metrics.iter().map(|m| m.mode).collect();
        assert_eq!(
            modes,
            vec![DeriveMode::Delta, DeriveMode::Rate, DeriveMode::Raw]
        );
        assert!(group.metrics[0].marker);
        assert!(!group.metrics[1].marker);

        let panel = Some("gc.num + gc.pause + heap".to_string());
        assert!(group.metrics.iter().all(|m| m.panel == panel));
    }

    #[test]
    fn test_legacy_marker_counter_prefix() {
        let group = parse_field_spec("marker:counter:gc.num").unwrap();
        assert!(group.metrics[0].marker);
        assert_eq!(group.metrics[0].mode, DeriveMode::Delta);
    }

    #[test]
    fn test_colon_inside_quoted_key() {
        let group = parse_field_spec(r#"counters["GET:/api"]"#).unwrap();
        assert_eq!(group.metrics[0].label, r#"counters["GET:/api"]"#);
    }

    #[test]
    fn test_invalid_specs() {
        assert!(matches!(
            parse_field_spec("bogus:heap"),
            Err(ConfigError::InvalidField { .. })
        ));
        assert!(matches!(
            parse_field_spec("heap+"),
            Err(ConfigError::InvalidField { .. })
        ));
        assert!(matches!(
            parse_field_spec("counter:a..b"),
            Err(ConfigError::InvalidPath(_))
        ));
    }
}
