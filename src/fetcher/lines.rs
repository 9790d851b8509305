//! Newline-delimited JSON source.

use std::io::{self, BufRead, BufReader};

use super::{Document, FetchError, Source};

/// Reads one JSON document per line, e.g. `curl -s ... | sparkmon -`.
///
/// Blank lines are skipped. End of input closes the source.
pub struct LineSource<R> {
    reader: R,
    line: String,
}

impl<R: BufRead + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl LineSource<BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send> Source for LineSource<R> {
    fn fetch(&mut self) -> Result<Document, FetchError> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .map_err(|e| FetchError::Network(e.to_string()))?;
            if read == 0 {
                return Err(FetchError::Closed);
            }
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed).map_err(|e| FetchError::Malformed(e.to_string()));
        }
    }

    fn is_periodic(&self) -> bool {
        false
    }
}
