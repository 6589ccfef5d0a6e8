//! Application layer containing the order placement orchestration.
//!
//! This module defines the `OrderService`, the entry point the transport layer
//! drives. It sequences the store write before the payment charge and turns
//! payment failures into a single structured error.

pub mod orders;
