use crate::domain::status::Status;
use thiserror::Error;

/// Failures reported by an order store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(u64),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDB(#[from] rocksdb::Error),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Outcome of a failed order operation.
#[derive(Error, Debug)]
pub enum OrderError {
    /// Store failures surface exactly as the store reported them.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The payment service rejected the charge; the status is the aggregated
    /// `invalid-argument` error with a single `payment` violation.
    #[error("payment declined: {0}")]
    PaymentDeclined(Status),
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl OrderError {
    /// Maps the error onto the status reported to RPC callers.
    pub fn to_status(&self) -> Status {
        match self {
            OrderError::Store(StoreError::NotFound(id)) => {
                Status::not_found(format!("order {id} not found"))
            }
            OrderError::Store(e) => Status::internal(e.to_string()),
            OrderError::PaymentDeclined(status) => status.clone(),
            OrderError::DeadlineExceeded => Status::deadline_exceeded("deadline exceeded"),
        }
    }
}

/// Errors raised by the service wiring around the core.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::status::{Code, FieldViolation};

    #[test]
    fn test_not_found_maps_to_not_found_status() {
        let err = OrderError::from(StoreError::NotFound(9));
        let status = err.to_status();
        assert_eq!(status.code, Code::NotFound);
        assert_eq!(status.message, "order 9 not found");
    }

    #[test]
    fn test_backend_error_keeps_message() {
        let err = OrderError::from(StoreError::Backend("connection refused".to_string()));
        let status = err.to_status();
        assert_eq!(status.code, Code::Internal);
        assert_eq!(status.message, "Storage backend error: connection refused");
    }

    #[test]
    fn test_declined_passes_status_through() {
        let declined = Status::invalid_argument("order creation failed")
            .with_violations(vec![FieldViolation::new("payment", "insufficient funds")]);
        let err = OrderError::PaymentDeclined(declined.clone());
        assert_eq!(err.to_status(), declined);
    }
}
