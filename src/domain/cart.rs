use super::catalog::{PriceSnapshot, ProductId};
use super::money::{Money, Quantity};
use super::pricing;
use serde::{Deserialize, Serialize};

pub type CartId = String;
pub type ItemId = u64;

/// A product selection sitting in a cart. Mutable until checkout.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CartLine {
    pub item_id: ItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub attributes: String,
    pub quantity: Quantity,
}

/// Input for adding a line; the store assigns the `item_id`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct NewCartLine {
    pub cart_id: CartId,
    pub product_id: ProductId,
    #[serde(default)]
    pub attributes: String,
    pub quantity: Quantity,
}

/// A cart line joined to its product's name and current prices.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PricedCartLine {
    pub line: CartLine,
    pub product_name: String,
    pub prices: PriceSnapshot,
}

impl PricedCartLine {
    pub fn unit_price(&self) -> Money {
        pricing::unit_price(self.prices.discounted_price, self.prices.price)
    }

    pub fn subtotal(&self) -> Money {
        pricing::line_subtotal(
            self.prices.discounted_price,
            self.prices.price,
            self.line.quantity,
        )
    }
}
