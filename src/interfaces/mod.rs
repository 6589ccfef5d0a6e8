//! Inbound adapters: RPC handler, JSON-lines framing and the TCP listener.

pub mod jsonl;
pub mod rpc;
pub mod server;
