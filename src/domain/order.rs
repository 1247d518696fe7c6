use super::cart::{ItemId, PricedCartLine};
use super::catalog::{ProductId, ShippingId, TaxId};
use super::money::{Money, Quantity};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub type OrderId = u64;
pub type CustomerId = u32;

/// Persisted order status. The numeric codes match the legacy `status` column.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Unpaid,
    Paid,
    /// A charge is in flight, or went through without the status being recorded.
    Charging,
}

impl OrderStatus {
    pub fn code(&self) -> u8 {
        match self {
            OrderStatus::Unpaid => 0,
            OrderStatus::Paid => 1,
            OrderStatus::Charging => 2,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Unpaid => "unpaid",
            OrderStatus::Paid => "paid",
            OrderStatus::Charging => "charging",
        };
        f.write_str(label)
    }
}

/// An order header. `total_amount` is fixed at creation and never recomputed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub shipping_id: ShippingId,
    pub tax_id: TaxId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_on: Timestamp,
    pub shipped_on: Option<Timestamp>,
    /// Gateway charge id once payment has been taken.
    pub reference: Option<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub shipping_id: ShippingId,
    pub tax_id: TaxId,
    pub total_amount: Money,
}

/// Immutable line-item snapshot written alongside its order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderDetail {
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub attributes: String,
    pub unit_cost: Money,
    pub quantity: Quantity,
}

/// An order detail before the store has assigned the order id.
#[derive(Debug, PartialEq, Clone)]
pub struct NewOrderDetail {
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub attributes: String,
    pub unit_cost: Money,
    pub quantity: Quantity,
}

impl From<&PricedCartLine> for NewOrderDetail {
    fn from(priced: &PricedCartLine) -> Self {
        Self {
            item_id: priced.line.item_id,
            product_id: priced.line.product_id,
            product_name: priced.product_name.clone(),
            attributes: priced.line.attributes.clone(),
            unit_cost: priced.unit_price(),
            quantity: priced.line.quantity,
        }
    }
}

impl NewOrderDetail {
    pub fn into_detail(self, order_id: OrderId) -> OrderDetail {
        OrderDetail {
            order_id,
            item_id: self.item_id,
            product_id: self.product_id,
            product_name: self.product_name,
            attributes: self.attributes,
            unit_cost: self.unit_cost,
            quantity: self.quantity,
        }
    }
}

/// Compare-and-set status change, scoped to the owning customer.
#[derive(Debug, PartialEq, Clone)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub reference: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OrderSummaryItem {
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub attributes: String,
    pub unit_cost: Money,
    pub quantity: Quantity,
    pub subtotal: Money,
}

impl From<OrderDetail> for OrderSummaryItem {
    fn from(detail: OrderDetail) -> Self {
        let subtotal = (detail.unit_cost * detail.quantity).rounded();
        Self {
            item_id: detail.item_id,
            product_id: detail.product_id,
            product_name: detail.product_name,
            attributes: detail.attributes,
            unit_cost: detail.unit_cost,
            quantity: detail.quantity,
            subtotal,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OrderSummary {
    pub order: Order,
    pub items: Vec<OrderSummaryItem>,
}
