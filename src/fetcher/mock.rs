//! Scripted source for tests and demos.

use std::collections::VecDeque;
use std::time::Duration;

use super::{Document, FetchError, Source};

/// Replays a fixed list of responses, then reports [`FetchError::Closed`]
/// (or repeats the last response when `repeat_last` is set).
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    responses: VecDeque<Result<Document, FetchError>>,
    last: Option<Result<Document, FetchError>>,
    repeat_last: bool,
    delay: Option<Duration>,
}

impl MockSource {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<Document, FetchError>>,
    {
        Self {
            responses: responses.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A source that fails with the same error forever.
    pub fn failing(error: FetchError) -> Self {
        Self::new([Err(error)]).repeat_last()
    }

    /// Keeps returning the final response instead of closing.
    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Sleeps before every response, simulating a slow endpoint.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Source for MockSource {
    fn fetch(&mut self) -> Result<Document, FetchError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.responses.pop_front() {
            Some(response) => {
                if self.repeat_last {
                    self.last = Some(response.clone());
                }
                response
            }
            None => match &self.last {
                Some(response) if self.repeat_last => response.clone(),
                _ => Err(FetchError::Closed),
            },
        }
    }
}
