use crate::error::{AppError, Result};
use crate::interfaces::rpc::messages::Request;
use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;

/// A request line: the request itself plus the caller's optional correlation id.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub request: Request,
}

/// Parses a single request line.
pub fn parse_request(line: &str) -> Result<RequestEnvelope> {
    serde_json::from_str(line.trim()).map_err(AppError::from)
}

/// Reads requests from a line-delimited JSON source.
///
/// Blank lines are skipped; every other line yields either a request or the
/// error that prevented decoding it, so one bad line does not stop the stream.
pub struct RequestReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> RequestReader<R> {
    /// Creates a new `RequestReader` from any buffered source (e.g., a file, stdin).
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Returns an iterator that lazily reads and decodes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<RequestEnvelope>> {
        self.source
            .lines()
            .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
            .map(|line| parse_request(&line?))
    }
}
