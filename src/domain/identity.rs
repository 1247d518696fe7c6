use super::order::CustomerId;
use thiserror::Error;

/// The customer a bearer credential resolves to.
#[derive(Debug, PartialEq, Clone)]
pub struct Identity {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum AuthError {
    #[error("credential is missing")]
    Missing,
    #[error("credential is not a bearer token")]
    Malformed,
    #[error("credential is not recognised")]
    Invalid,
    #[error("credential has expired")]
    Expired,
}
