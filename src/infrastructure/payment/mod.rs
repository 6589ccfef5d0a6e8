//! Payment service clients.

pub mod http;
pub mod retry;

pub use http::HttpPaymentClient;
pub use retry::{RetryPolicy, RetryingPaymentClient};
