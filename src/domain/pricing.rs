//! Pure cart pricing. No I/O.
//!
//! All arithmetic runs on [`Money`], so no binary floating point is involved.
//! Only the final total is rounded, with [`round2`](super::money::round2).

use super::cart::{ItemId, PricedCartLine};
use super::money::{Money, Quantity};
use crate::error::CheckoutError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// The price a unit actually sells for: the discounted price when set, else the list price.
pub fn unit_price(discounted_price: Money, price: Money) -> Money {
    if discounted_price.is_zero() {
        price
    } else {
        discounted_price
    }
}

pub fn line_subtotal(discounted_price: Money, price: Money, quantity: Quantity) -> Money {
    unit_price(discounted_price, price) * quantity
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct LinePrice {
    pub item_id: ItemId,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub subtotal: Money,
}

/// Result of pricing a set of cart lines.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PriceBreakdown {
    pub lines: Vec<LinePrice>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    /// Unrounded tax on `subtotal + shipping_cost`.
    pub tax_amount: Decimal,
    pub total: Money,
}

/// Prices `lines` with shipping and a tax percentage.
///
/// An empty slice is priced from shipping and tax alone; rejecting an empty
/// checkout is the caller's decision.
///
/// # Errors
///
/// Returns a validation error when `tax_percentage` is negative.
pub fn order_total(
    lines: &[PricedCartLine],
    shipping_cost: Money,
    tax_percentage: Decimal,
) -> Result<PriceBreakdown, CheckoutError> {
    if tax_percentage < Decimal::ZERO {
        return Err(CheckoutError::ValidationError(
            "Tax percentage must not be negative".to_string(),
        ));
    }

    let priced: Vec<LinePrice> = lines
        .iter()
        .map(|line| LinePrice {
            item_id: line.line.item_id,
            unit_price: line.unit_price(),
            quantity: line.line.quantity,
            subtotal: line.subtotal(),
        })
        .collect();

    let subtotal: Money = priced.iter().map(|line| line.subtotal).sum();
    let with_shipping = subtotal + shipping_cost;
    let tax_amount = (tax_percentage / dec!(100)) * with_shipping.value();
    let total = Money::new(with_shipping.value() + tax_amount)?.rounded();

    Ok(PriceBreakdown {
        lines: priced,
        subtotal,
        shipping_cost,
        tax_amount,
        total,
    })
}
