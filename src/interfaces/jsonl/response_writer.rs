use crate::domain::status::Status;
use crate::error::Result;
use crate::interfaces::rpc::messages::Reply;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Result of one request as it appears on the wire: `{"ok": ...}` or
/// `{"error": ...}`.
#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok(Reply),
    Error(Status),
}

impl From<std::result::Result<Reply, Status>> for Outcome {
    fn from(result: std::result::Result<Reply, Status>) -> Self {
        match result {
            Ok(reply) => Outcome::Ok(reply),
            Err(status) => Outcome::Error(status),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ResponseEnvelope {
    pub fn new(id: Option<Value>, outcome: impl Into<Outcome>) -> Self {
        Self {
            id,
            outcome: outcome.into(),
        }
    }
}

/// Encodes a response as a single line, newline included.
pub fn encode_response(response: &ResponseEnvelope) -> Result<String> {
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    Ok(line)
}

/// Writes responses as line-delimited JSON.
pub struct ResponseWriter<W: Write> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_response(&mut self, response: &ResponseEnvelope) -> Result<()> {
        self.writer.write_all(encode_response(response)?.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}
