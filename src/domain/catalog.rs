use super::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = u32;
pub type ShippingId = u32;
pub type TaxId = u32;

/// The price-bearing slice of a catalog product.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    /// Zero means "no discount".
    pub discounted_price: Money,
}

impl Product {
    pub fn price_snapshot(&self) -> PriceSnapshot {
        PriceSnapshot {
            price: self.price,
            discounted_price: self.discounted_price,
        }
    }
}

/// Current product prices, copied onto a cart line when it is read.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct PriceSnapshot {
    pub price: Money,
    pub discounted_price: Money,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Shipping {
    pub shipping_id: ShippingId,
    #[serde(default)]
    pub shipping_type: String,
    pub shipping_cost: Money,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Tax {
    pub tax_id: TaxId,
    #[serde(default)]
    pub tax_type: String,
    /// Percentage points, e.g. `8.5` for 8.5%.
    pub tax_percentage: Decimal,
}
