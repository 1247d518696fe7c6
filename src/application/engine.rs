use super::cart::CartService;
use super::checkout::CheckoutService;
use super::settlement::{PaymentSettler, SettlementOptions};
use crate::domain::identity::Identity;
use crate::domain::ports::{
    CartStoreHandle, CatalogStoreHandle, IdentityVerifierHandle, MailerHandle, OrderStoreHandle,
    PaymentGatewayHandle,
};
use crate::error::{CheckoutError, Result};
use tracing::debug;

/// Every collaborator the storefront needs, created once per process.
#[derive(Clone)]
pub struct Collaborators {
    pub catalog: CatalogStoreHandle,
    pub carts: CartStoreHandle,
    pub orders: OrderStoreHandle,
    pub gateway: PaymentGatewayHandle,
    pub mailer: MailerHandle,
    pub identity: IdentityVerifierHandle,
}

/// The entry point used by inbound adapters.
///
/// Owns no state of its own; each request goes straight to the services,
/// which share the collaborator handles.
#[derive(Clone)]
pub struct Storefront {
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub payments: PaymentSettler,
    identity: IdentityVerifierHandle,
}

impl Storefront {
    pub fn new(collaborators: Collaborators, options: SettlementOptions) -> Self {
        let Collaborators {
            catalog,
            carts,
            orders,
            gateway,
            mailer,
            identity,
        } = collaborators;

        Self {
            carts: CartService::new(carts.clone(), catalog.clone()),
            checkout: CheckoutService::new(carts, catalog, orders.clone()),
            payments: PaymentSettler::new(orders, gateway, mailer, options),
            identity,
        }
    }

    /// Resolves a bearer credential to the calling customer.
    pub async fn authenticate(&self, credential: &str) -> Result<Identity> {
        let identity = self
            .identity
            .verify(credential.to_string())
            .await
            .map_err(|e| CheckoutError::Unauthorized(e.to_string()))?;
        debug!(customer_id = identity.customer_id, "credential verified");
        Ok(identity)
    }
}
