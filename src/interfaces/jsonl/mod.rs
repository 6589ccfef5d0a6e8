//! Line-delimited JSON framing shared by the batch runner and the TCP listener.
//!
//! Each line carries one request (or response). A request may include an `id`
//! that is echoed on its response so callers can match them up when responses
//! arrive out of order.

pub mod request_reader;
pub mod response_writer;

pub use request_reader::{RequestEnvelope, RequestReader, parse_request};
pub use response_writer::{Outcome, ResponseEnvelope, ResponseWriter, encode_response};
