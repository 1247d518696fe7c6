use crate::domain::payment::{Charge, ChargeRequest, GatewayError};
use crate::domain::ports::PaymentGateway;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Source token the sandbox always declines.
pub const DECLINED_TOKEN: &str = "tok_chargeDeclined";

/// An in-process stand-in for a card processor.
///
/// Accepts any `tok_` source token except [`DECLINED_TOKEN`]. Charges are
/// remembered by idempotency key, so replaying a request returns the
/// first charge instead of taking the money twice.
#[derive(Default, Clone)]
pub struct SandboxGateway {
    charges: Arc<Mutex<HashMap<String, Charge>>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct charges taken so far.
    pub async fn charge_count(&self) -> usize {
        self.charges.lock().await.len()
    }

}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<Charge, GatewayError> {
        if !request.source_token.starts_with("tok_") {
            return Err(GatewayError::Declined(
                "source token is not recognised".to_string(),
            ));
        }
        if request.source_token == DECLINED_TOKEN {
            return Err(GatewayError::Declined("your card was declined".to_string()));
        }
        if request.amount_minor == 0 {
            return Err(GatewayError::Declined(
                "amount must be greater than zero".to_string(),
            ));
        }

        let mut charges = self.charges.lock().await;
        if let Some(existing) = charges.get(&request.idempotency_key) {
            debug!(key = %request.idempotency_key, "replayed charge request");
            return Ok(existing.clone());
        }

        let charge = Charge {
            charge_id: format!("ch_{}", Uuid::new_v4().simple()),
            amount_minor: request.amount_minor,
            currency: request.currency,
        };
        charges.insert(request.idempotency_key, charge.clone());
        Ok(charge)
    }

    async fn charge_for(&self, idempotency_key: String) -> Result<Option<Charge>, GatewayError> {
        Ok(self.charges.lock().await.get(&idempotency_key).cloned())
    }
}
