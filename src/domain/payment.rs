use super::order::OrderId;
use thiserror::Error;

/// A request to take money from a tokenised payment source.
#[derive(Debug, PartialEq, Clone)]
pub struct ChargeRequest {
    pub amount_minor: u64,
    pub currency: String,
    pub description: String,
    pub source_token: String,
    /// Repeated requests with the same key must not charge twice.
    pub idempotency_key: String,
}

impl ChargeRequest {
    pub fn idempotency_key_for(order_id: OrderId) -> String {
        format!("order-{order_id}")
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Charge {
    pub charge_id: String,
    pub amount_minor: u64,
    pub currency: String,
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum GatewayError {
    #[error("card declined: {0}")]
    Declined(String),
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    #[error("gateway did not answer within {0} ms")]
    Timeout(u64),
}
