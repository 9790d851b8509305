//! Field path expressions over JSON documents.
//!
//! A path is a sequence of object keys and array indices:
//!
//! | Form            | Example                   |
//! |-----------------|---------------------------|
//! | dotted keys     | `memstats.heap_alloc`     |
//! | bracket index   | `memstats.pause_ns[3]`    |
//! | jq-style index  | `memstats.pause_ns.[3]`   |
//! | quoted key      | `gauges["http.requests"]` |
//!
//! A leading `.` is accepted. A plain key applied to an array is read as an
//! index when it is numeric (`items.0.size`).

use serde_json::Value;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<Segment>,
}

/// Syntax error in a path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSyntaxError {
    pub path: String,
    pub position: usize,
    pub message: &'static str,
}

impl std::fmt::Display for PathSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid path '{}' at {}: {}",
            self.path, self.position, self.message
        )
    }
}

impl std::error::Error for PathSyntaxError {}

/// Failure to read a numeric value from a document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Object has no such key.
    MissingKey { path: String, key: String },
    /// Array is shorter than the index.
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    /// Path walks into a value of the wrong kind.
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// String leaf that does not parse as a number.
    NotNumeric { path: String, value: String },
    /// Timestamp field that is neither unix seconds nor RFC 3339.
    InvalidTimestamp { path: String, value: String },
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::MissingKey { path, key } => {
                write!(f, "{}: missing key '{}'", path, key)
            }
            ExtractionError::IndexOutOfRange { path, index, len } => {
                write!(f, "{}: index {} out of range (len {})", path, index, len)
            }
            ExtractionError::TypeMismatch {
                path,
                expected,
                found,
            } => write!(f, "{}: expected {}, found {}", path, expected, found),
            ExtractionError::NotNumeric { path, value } => {
                write!(f, "{}: '{}' is not a number", path, value)
            }
            ExtractionError::InvalidTimestamp { path, value } => {
                write!(f, "{}: '{}' is not a timestamp", path, value)
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

impl FieldPath {
    /// Parses a path expression.
    pub fn parse(input: &str) -> Result<Self, PathSyntaxError> {
        let chars: Vec<char> = input.chars().collect();
        let err = |position: usize, message: &'static str| PathSyntaxError {
            path: input.to_string(),
            position,
            message,
        };

        let mut segments = Vec::new();
        let mut i = usize::from(chars.first() == Some(&'.'));
        if i >= chars.len() {
            return Err(err(i, "empty path"));
        }

        loop {
            if chars[i] == '[' {
                let (segment, next) = parse_bracket(&chars, i).map_err(|m| err(i, m))?;
                segments.push(segment);
                i = next;
            } else {
                let start = i;
                while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                    i += 1;
                }
                if i == start {
                    return Err(err(i, "empty segment"));
                }
                segments.push(Segment::Key(chars[start..i].iter().collect()));
            }

            match chars.get(i) {
                None => break,
                Some('.') => {
                    i += 1;
                    if i >= chars.len() {
                        return Err(err(i, "trailing '.'"));
                    }
                }
                Some('[') => {}
                Some(_) => return Err(err(i, "expected '.' or '['")),
            }
        }

        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walks `doc` and returns the value the path points at.
    pub fn lookup<'a>(&self, doc: &'a Value) -> Result<&'a Value, ExtractionError> {
        let mut current = doc;
        for segment in &self.segments {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => {
                    map.get(key).ok_or_else(|| ExtractionError::MissingKey {
                        path: self.raw.clone(),
                        key: key.clone(),
                    })?
                }
                (Segment::Key(key), Value::Array(items)) => match key.parse::<usize>() {
                    Ok(index) => self.index(items, index)?,
                    Err(_) => return Err(self.mismatch("object", current)),
                },
                (Segment::Index(index), Value::Array(items)) => self.index(items, *index)?,
                (Segment::Key(_), _) => return Err(self.mismatch("object", current)),
                (Segment::Index(_), _) => return Err(self.mismatch("array", current)),
            };
        }
        Ok(current)
    }

    /// Reads the numeric value the path points at.
    ///
    /// Booleans read as 0/1 and numeric strings are parsed.
    pub fn extract(&self, doc: &Value) -> Result<f64, ExtractionError> {
        match self.lookup(doc)? {
            Value::Number(n) => n.as_f64().ok_or_else(|| ExtractionError::NotNumeric {
                path: self.raw.clone(),
                value: n.to_string(),
            }),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ExtractionError::NotNumeric {
                    path: self.raw.clone(),
                    value: s.clone(),
                }),
            other => Err(self.mismatch("number", other)),
        }
    }

    fn index<'a>(&self, items: &'a [Value], index: usize) -> Result<&'a Value, ExtractionError> {
        items
            .get(index)
            .ok_or_else(|| ExtractionError::IndexOutOfRange {
                path: self.raw.clone(),
                index,
                len: items.len(),
            })
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> ExtractionError {
        ExtractionError::TypeMismatch {
            path: self.raw.clone(),
            expected,
            found: value_kind(found),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for FieldPath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses `[123]`, `["key"]` or `['key']` starting at `start`.
fn parse_bracket(chars: &[char], start: usize) -> Result<(Segment, usize), &'static str> {
    let mut i = start + 1;
    match chars.get(i) {
        Some(&quote) if quote == '"' || quote == '\'' => {
            i += 1;
            let key_start = i;
            while i < chars.len() && chars[i] != quote {
                i += 1;
            }
            if i >= chars.len() {
                return Err("unterminated quoted key");
            }
            let key: String = chars[key_start..i].iter().collect();
            if chars.get(i + 1) != Some(&']') {
                return Err("expected ']' after quoted key");
            }
            Ok((Segment::Key(key), i + 2))
        }
        Some(_) => {
            let digits_start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i == digits_start {
                return Err("expected index or quoted key");
            }
            if chars.get(i) != Some(&']') {
                return Err("expected ']'");
            }
            let digits: String = chars[digits_start..i].iter().collect();
            let index = digits.parse::<usize>().map_err(|_| "index too large")?;
            Ok((Segment::Index(index), i + 1))
        }
        None => Err("unterminated '['"),
    }
}

/// Short name of a JSON value kind, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
