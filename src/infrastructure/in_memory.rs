use crate::domain::cart::{CartId, CartLine, ItemId, NewCartLine, PricedCartLine};
use crate::domain::catalog::{Product, ProductId, Shipping, ShippingId, Tax, TaxId};
use crate::domain::money::Quantity;
use crate::domain::order::{
    CustomerId, NewOrder, NewOrderDetail, Order, OrderDetail, OrderId, StatusChange,
};
use crate::domain::ports::{CartStore, CatalogStore, OrderStore};
use crate::error::Result;
use async_trait::async_trait;
use jiff::Timestamp;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    shippings: HashMap<ShippingId, Shipping>,
    taxes: BTreeMap<TaxId, Tax>,
    cart_lines: BTreeMap<ItemId, CartLine>,
    last_item_id: ItemId,
    orders: BTreeMap<OrderId, Order>,
    details: HashMap<OrderId, Vec<OrderDetail>>,
    last_order_id: OrderId,
}

/// A thread-safe in-memory store for the catalog, carts and orders.
///
/// All tables sit behind one `Arc<RwLock<..>>`, so multi-row writes such as
/// order creation happen under a single write lock.
/// Ideal for testing or single-process runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn store_product(&self, product: Product) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.products.insert(product.product_id, product);
        Ok(())
    }

    async fn product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&product_id).cloned())
    }

    async fn store_shipping(&self, shipping: Shipping) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.shippings.insert(shipping.shipping_id, shipping);
        Ok(())
    }

    async fn shipping(&self, shipping_id: ShippingId) -> Result<Option<Shipping>> {
        let tables = self.tables.read().await;
        Ok(tables.shippings.get(&shipping_id).cloned())
    }

    async fn store_tax(&self, tax: Tax) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.taxes.insert(tax.tax_id, tax);
        Ok(())
    }

    async fn tax(&self, tax_id: TaxId) -> Result<Option<Tax>> {
        let tables = self.tables.read().await;
        Ok(tables.taxes.get(&tax_id).cloned())
    }

    async fn taxes(&self) -> Result<Vec<Tax>> {
        let tables = self.tables.read().await;
        Ok(tables.taxes.values().cloned().collect())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn insert_line(&self, line: NewCartLine) -> Result<CartLine> {
        let mut tables = self.tables.write().await;
        tables.last_item_id += 1;
        let created = CartLine {
            item_id: tables.last_item_id,
            cart_id: line.cart_id,
            product_id: line.product_id,
            attributes: line.attributes,
            quantity: line.quantity,
        };
        tables.cart_lines.insert(created.item_id, created.clone());
        Ok(created)
    }

    async fn priced_lines(&self, cart_id: CartId) -> Result<Vec<PricedCartLine>> {
        let tables = self.tables.read().await;
        Ok(tables
            .cart_lines
            .values()
            .filter(|line| line.cart_id == cart_id)
            .filter_map(|line| {
                tables.products.get(&line.product_id).map(|product| PricedCartLine {
                    line: line.clone(),
                    product_name: product.name.clone(),
                    prices: product.price_snapshot(),
                })
            })
            .collect())
    }

    async fn update_quantity(&self, item_id: ItemId, quantity: Quantity) -> Result<Option<CartLine>> {
        let mut tables = self.tables.write().await;
        Ok(tables.cart_lines.get_mut(&item_id).map(|line| {
            line.quantity = quantity;
            line.clone()
        }))
    }

    async fn remove_line(&self, item_id: ItemId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.cart_lines.remove(&item_id).is_some())
    }

    async fn clear(&self, cart_id: CartId) -> Result<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.cart_lines.len();
        tables.cart_lines.retain(|_, line| line.cart_id != cart_id);
        Ok(before - tables.cart_lines.len())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create_order(&self, order: NewOrder, details: Vec<NewOrderDetail>) -> Result<Order> {
        let mut tables = self.tables.write().await;
        tables.last_order_id += 1;
        let order_id = tables.last_order_id;

        let created = Order {
            order_id,
            customer_id: order.customer_id,
            shipping_id: order.shipping_id,
            tax_id: order.tax_id,
            total_amount: order.total_amount,
            status: Default::default(),
            created_on: Timestamp::now(),
            shipped_on: None,
            reference: None,
        };
        let details = details
            .into_iter()
            .map(|detail| detail.into_detail(order_id))
            .collect();

        tables.orders.insert(order_id, created.clone());
        tables.details.insert(order_id, details);
        Ok(created)
    }

    async fn order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&order_id).cloned())
    }

    async fn details(&self, order_id: OrderId) -> Result<Vec<OrderDetail>> {
        let tables = self.tables.read().await;
        Ok(tables.details.get(&order_id).cloned().unwrap_or_default())
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .values()
            .filter(|order| order.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn transition_status(&self, change: StatusChange) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.orders.get_mut(&change.order_id) {
            Some(order) if order.customer_id == change.customer_id && order.status == change.from => {
                order.status = change.to;
                if change.reference.is_some() {
                    order.reference = change.reference;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
