use super::cart::{CartId, CartLine, ItemId, NewCartLine, PricedCartLine};
use super::catalog::{Product, ProductId, Shipping, ShippingId, Tax, TaxId};
use super::identity::{AuthError, Identity};
use super::money::Quantity;
use super::notification::{MailError, Notification};
use super::order::{CustomerId, NewOrder, NewOrderDetail, Order, OrderDetail, OrderId, StatusChange};
use super::payment::{Charge, ChargeRequest, GatewayError};
use crate::error::Result;
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;

#[automock]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn store_product(&self, product: Product) -> Result<()>;
    async fn product(&self, product_id: ProductId) -> Result<Option<Product>>;
    async fn store_shipping(&self, shipping: Shipping) -> Result<()>;
    async fn shipping(&self, shipping_id: ShippingId) -> Result<Option<Shipping>>;
    async fn store_tax(&self, tax: Tax) -> Result<()>;
    async fn tax(&self, tax_id: TaxId) -> Result<Option<Tax>>;
    async fn taxes(&self) -> Result<Vec<Tax>>;
}

#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn insert_line(&self, line: NewCartLine) -> Result<CartLine>;
    /// Lines of `cart_id` in insertion order, joined to their products.
    /// Lines whose product is gone are left out.
    async fn priced_lines(&self, cart_id: CartId) -> Result<Vec<PricedCartLine>>;
    async fn update_quantity(&self, item_id: ItemId, quantity: Quantity) -> Result<Option<CartLine>>;
    async fn remove_line(&self, item_id: ItemId) -> Result<bool>;
    async fn clear(&self, cart_id: CartId) -> Result<usize>;
}

#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes the header and every detail row, or nothing.
    async fn create_order(&self, order: NewOrder, details: Vec<NewOrderDetail>) -> Result<Order>;
    async fn order(&self, order_id: OrderId) -> Result<Option<Order>>;
    async fn details(&self, order_id: OrderId) -> Result<Vec<OrderDetail>>;
    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;
    /// Applies `change` only if the order exists, belongs to the customer and
    /// is currently in `change.from`. Returns whether it was applied.
    async fn transition_status(&self, change: StatusChange) -> Result<bool>;
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: ChargeRequest) -> std::result::Result<Charge, GatewayError>;
    /// The charge taken under `idempotency_key`, if any. Declined and
    /// unfinished requests have none.
    async fn charge_for(
        &self,
        idempotency_key: String,
    ) -> std::result::Result<Option<Charge>, GatewayError>;
}

#[automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: Notification) -> std::result::Result<(), MailError>;
}

#[automock]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: String) -> std::result::Result<Identity, AuthError>;
}

pub type CatalogStoreHandle = Arc<dyn CatalogStore>;
pub type CartStoreHandle = Arc<dyn CartStore>;
pub type OrderStoreHandle = Arc<dyn OrderStore>;
pub type PaymentGatewayHandle = Arc<dyn PaymentGateway>;
pub type MailerHandle = Arc<dyn Mailer>;
pub type IdentityVerifierHandle = Arc<dyn IdentityVerifier>;
