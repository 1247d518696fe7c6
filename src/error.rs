use crate::domain::order::OrderId;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation failed: {0}")]
    ValidationError(String),
    #[error("payment failed for order {order_id}: {reason}")]
    PaymentFailed { order_id: OrderId, reason: String },
    #[error("partial failure: {0}")]
    PartialFailure(#[from] PartialFailure),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CheckoutError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}

/// Outcomes where some side effect landed and a later one did not.
#[derive(Error, Debug)]
pub enum PartialFailure {
    /// The gateway took the money but the order could not be marked paid.
    /// The order stays in `Charging` until reconciled with `charge_id`.
    #[error("order {order_id} was charged ({charge_id}) but its status could not be recorded: {source}")]
    ChargedButUnrecorded {
        order_id: OrderId,
        charge_id: String,
        #[source]
        source: Box<CheckoutError>,
    },
    /// The charge failed but the order could not be put back to `Unpaid`,
    /// so it is still held in `Charging`.
    #[error("charge for order {order_id} failed ({reason}) but the order could not be released: {source}")]
    DeclinedButNotReleased {
        order_id: OrderId,
        reason: String,
        #[source]
        source: Box<CheckoutError>,
    },
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CheckoutError {
    fn from(error: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(error))
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(error: serde_json::Error) -> Self {
        Self::InternalError(Box::new(error))
    }
}
