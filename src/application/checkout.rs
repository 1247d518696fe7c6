use crate::domain::cart::PricedCartLine;
use crate::domain::catalog::{Shipping, ShippingId, Tax, TaxId};
use crate::domain::order::{
    CustomerId, NewOrder, NewOrderDetail, Order, OrderId, OrderSummary, OrderSummaryItem,
};
use crate::domain::ports::{CartStoreHandle, CatalogStoreHandle, OrderStoreHandle};
use crate::domain::pricing::{self, PriceBreakdown};
use crate::error::{CheckoutError, Result};
use tracing::info;

/// Turns carts into orders and answers order queries.
#[derive(Clone)]
pub struct CheckoutService {
    carts: CartStoreHandle,
    catalog: CatalogStoreHandle,
    orders: OrderStoreHandle,
}

impl CheckoutService {
    pub fn new(
        carts: CartStoreHandle,
        catalog: CatalogStoreHandle,
        orders: OrderStoreHandle,
    ) -> Self {
        Self {
            carts,
            catalog,
            orders,
        }
    }

    pub async fn shipping(&self, shipping_id: ShippingId) -> Result<Shipping> {
        self.catalog
            .shipping(shipping_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("shipping", shipping_id))
    }

    pub async fn tax(&self, tax_id: TaxId) -> Result<Tax> {
        self.catalog
            .tax(tax_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("tax", tax_id))
    }

    pub async fn taxes(&self) -> Result<Vec<Tax>> {
        self.catalog.taxes().await
    }

    /// Prices the cart as it stands now, without writing anything.
    pub async fn price_cart(
        &self,
        cart_id: &str,
        shipping_id: ShippingId,
        tax_id: TaxId,
    ) -> Result<PriceBreakdown> {
        let (shipping, tax) = self.reference_data(shipping_id, tax_id).await?;
        let lines = self.carts.priced_lines(cart_id.to_string()).await?;
        pricing::order_total(&lines, shipping.shipping_cost, tax.tax_percentage)
    }

    /// Creates an order and its line-item snapshot from the cart.
    ///
    /// Shipping and tax are resolved first, so an unknown id creates nothing.
    /// The cart itself is left untouched.
    pub async fn create_order(
        &self,
        cart_id: &str,
        shipping_id: ShippingId,
        tax_id: TaxId,
        customer_id: CustomerId,
    ) -> Result<OrderId> {
        let (shipping, tax) = self.reference_data(shipping_id, tax_id).await?;

        let lines: Vec<PricedCartLine> = self.carts.priced_lines(cart_id.to_string()).await?;
        if lines.is_empty() {
            return Err(CheckoutError::ValidationError(format!(
                "cart {cart_id} has no items to order"
            )));
        }

        let breakdown = pricing::order_total(&lines, shipping.shipping_cost, tax.tax_percentage)?;
        let details: Vec<NewOrderDetail> = lines.iter().map(NewOrderDetail::from).collect();

        let order = self
            .orders
            .create_order(
                NewOrder {
                    customer_id,
                    shipping_id,
                    tax_id,
                    total_amount: breakdown.total,
                },
                details,
            )
            .await?;

        info!(
            order_id = order.order_id,
            customer_id,
            cart_id,
            total = %order.total_amount,
            items = lines.len(),
            "order created"
        );
        Ok(order.order_id)
    }

    /// The order and its items, if it belongs to `customer_id`.
    pub async fn order_summary(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
    ) -> Result<OrderSummary> {
        let order = self.owned_order(order_id, customer_id).await?;
        let items = self
            .orders
            .details(order_id)
            .await?
            .into_iter()
            .map(OrderSummaryItem::from)
            .collect();
        Ok(OrderSummary { order, items })
    }

    pub async fn customer_orders(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        self.orders.orders_for_customer(customer_id).await
    }

    async fn owned_order(&self, order_id: OrderId, customer_id: CustomerId) -> Result<Order> {
        match self.orders.order(order_id).await? {
            Some(order) if order.customer_id == customer_id => Ok(order),
            _ => Err(CheckoutError::not_found("order", order_id)),
        }
    }

    async fn reference_data(&self, shipping_id: ShippingId, tax_id: TaxId) -> Result<(Shipping, Tax)> {
        let shipping = self.shipping(shipping_id).await?;
        let tax = self.tax(tax_id).await?;
        Ok((shipping, tax))
    }
}
