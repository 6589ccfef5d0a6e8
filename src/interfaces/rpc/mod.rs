//! Order RPC surface: wire messages and the handler that maps them onto the
//! application layer.

pub mod handler;
pub mod messages;

pub use handler::{CALL_TIMEOUT, OrderHandler};
