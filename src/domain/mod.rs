//! Domain model and the ports the application layer depends on.

pub mod context;
pub mod order;
pub mod ports;
pub mod status;
