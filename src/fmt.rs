//! Shared formatting helpers for panel titles and the header.

const SI_PREFIXES: [(f64, &str); 12] = [
    (1e24, "Y"),
    (1e21, "Z"),
    (1e18, "E"),
    (1e15, "P"),
    (1e12, "T"),
    (1e9, "G"),
    (1e6, "M"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "µ"),
    (1e-9, "n"),
];

/// Format a value with an SI prefix and three significant digits.
///
/// `1234.0` → `"1.23k"`, `0.0042` → `"4.2m"`, `-5e6` → `"-5M"`,
/// `999.9` → `"1k"`. Magnitudes below the smallest prefix use exponent
/// notation: `3.5e-12` → `"3.5e-12"`.
pub fn format_si(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    let last = SI_PREFIXES.len() - 1;
    if magnitude < SI_PREFIXES[last].0 {
        return format_exponent(value);
    }

    let mut index = SI_PREFIXES
        .iter()
        .position(|(factor, _)| magnitude >= *factor)
        .unwrap_or(last);
    loop {
        let (factor, prefix) = SI_PREFIXES[index];
        let (rounded, digits) = round_significant(value / factor);
        // Rounding can carry into the next prefix: 999.9 -> 1000 -> 1k.
        if rounded.abs() >= 1000.0 && index > 0 {
            index -= 1;
            continue;
        }
        return format!("{}{}", trim_fraction(&format!("{:.*}", digits, rounded)), prefix);
    }
}

/// Rounds to three significant digits for values in `[1, 1000)`.
fn round_significant(scaled: f64) -> (f64, usize) {
    let digits: i32 = if scaled.abs() >= 100.0 {
        0
    } else if scaled.abs() >= 10.0 {
        1
    } else {
        2
    };
    let pow = 10f64.powi(digits);
    ((scaled * pow).round() / pow, digits as usize)
}

fn format_exponent(value: f64) -> String {
    let text = format!("{:.2e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => format!("{}e{}", trim_fraction(mantissa), exponent),
        None => text,
    }
}

/// `"1.50"` → `"1.5"`, `"2.00"` → `"2"`.
fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

/// Format a value with SI prefix and an optional unit suffix.
pub fn format_value(value: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) => format!("{}{}", format_si(value), unit),
        None => format_si(value),
    }
}

/// Format an age in seconds: `"42s"`, `"3m5s"`, `"2h10m"`, `"1d3h"`.
pub fn format_age(secs: i64) -> String {
    if secs < 0 {
        return "-".to_string();
    }
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d{}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Truncate `text` to at most `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_si() {
        assert_eq!(format_si(0.0), "0");
        assert_eq!(format_si(1.0), "1");
        assert_eq!(format_si(50.0), "50");
        assert_eq!(format_si(999.0), "999");
        assert_eq!(format_si(1234.0), "1.23k");
        assert_eq!(format_si(1500.0), "1.5k");
        assert_eq!(format_si(12_345_678.0), "12.3M");
        assert_eq!(format_si(-5e6), "-5M");
        assert_eq!(format_si(0.0042), "4.2m");
        assert_eq!(format_si(3.5e-12), "3.5e-12");
        assert_eq!(format_si(1e-12), "1e-12");
        assert_eq!(format_si(f64::NAN), "NaN");
        assert_eq!(format_si(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn test_format_si_rounding_carries_to_next_prefix() {
        assert_eq!(format_si(999.9), "1k");
        assert_eq!(format_si(-999.9), "-1k");
        assert_eq!(format_si(999_999.0), "1M");
        assert_eq!(format_si(0.0009999), "1m");
        assert_eq!(format_si(9.999), "10");
        assert_eq!(format_si(99.99), "100");
    }

    #[test]
    fn test_format_value_with_unit() {
        assert_eq!(format_value(2500.0, Some("B")), "2.5kB");
        assert_eq!(format_value(3.0, None), "3");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(-1), "-");
        assert_eq!(format_age(42), "42s");
        assert_eq!(format_age(185), "3m5s");
        assert_eq!(format_age(7800), "2h10m");
        assert_eq!(format_age(97200), "1d3h");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("heap", 10), "heap");
        assert_eq!(truncate("memstats.heap", 6), "memst…");
        assert_eq!(truncate("abc", 0), "");
    }
}
