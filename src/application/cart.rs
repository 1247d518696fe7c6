use crate::domain::cart::{CartId, CartLine, ItemId, NewCartLine, PricedCartLine};
use crate::domain::money::Quantity;
use crate::domain::ports::{CartStoreHandle, CatalogStoreHandle};
use crate::error::{CheckoutError, Result};
use tracing::debug;
use uuid::Uuid;

/// Cart reads and maintenance.
///
/// Carts are plain line collections keyed by a caller-held id; nothing here
/// touches orders, and checking out leaves the cart as it was.
#[derive(Clone)]
pub struct CartService {
    carts: CartStoreHandle,
    catalog: CatalogStoreHandle,
}

impl CartService {
    pub fn new(carts: CartStoreHandle, catalog: CatalogStoreHandle) -> Self {
        Self { carts, catalog }
    }

    /// Generates a fresh, unused cart identifier.
    pub fn generate_cart_id() -> CartId {
        format!("cart_{}", Uuid::new_v4().simple())
    }

    pub async fn add_item(&self, line: NewCartLine) -> Result<CartLine> {
        validate_cart_id(&line.cart_id)?;

        if self.catalog.product(line.product_id).await?.is_none() {
            return Err(CheckoutError::not_found("product", line.product_id));
        }

        let created = self.carts.insert_line(line).await?;
        debug!(
            cart_id = %created.cart_id,
            item_id = created.item_id,
            product_id = created.product_id,
            "cart line added"
        );
        Ok(created)
    }

    /// Returns the cart's lines with current product prices.
    ///
    /// A cart without lines is an empty vector, not an error.
    pub async fn read_cart(&self, cart_id: &str) -> Result<Vec<PricedCartLine>> {
        validate_cart_id(cart_id)?;
        self.carts.priced_lines(cart_id.to_string()).await
    }

    pub async fn update_quantity(&self, item_id: ItemId, quantity: u32) -> Result<CartLine> {
        let quantity = Quantity::new(quantity)?;
        self.carts
            .update_quantity(item_id, quantity)
            .await?
            .ok_or_else(|| CheckoutError::not_found("cart item", item_id))
    }

    pub async fn remove_item(&self, item_id: ItemId) -> Result<()> {
        if self.carts.remove_line(item_id).await? {
            Ok(())
        } else {
            Err(CheckoutError::not_found("cart item", item_id))
        }
    }

    /// Removes every line of the cart and returns how many were removed.
    pub async fn empty_cart(&self, cart_id: &str) -> Result<usize> {
        validate_cart_id(cart_id)?;
        self.carts.clear(cart_id.to_string()).await
    }
}

fn validate_cart_id(cart_id: &str) -> Result<()> {
    if cart_id.trim().is_empty() {
        Err(CheckoutError::ValidationError(
            "cart_id must not be empty".to_string(),
        ))
    } else {
        Ok(())
    }
}
