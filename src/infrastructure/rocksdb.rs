use crate::domain::cart::{CartId, CartLine, ItemId, NewCartLine, PricedCartLine};
use crate::domain::catalog::{Product, ProductId, Shipping, ShippingId, Tax, TaxId};
use crate::domain::money::Quantity;
use crate::domain::order::{
    CustomerId, NewOrder, NewOrderDetail, Order, OrderDetail, OrderId, OrderStatus, StatusChange,
};
use crate::domain::ports::{CartStore, CatalogStore, OrderStore};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use jiff::Timestamp;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CF_PRODUCTS: &str = "products";
pub const CF_SHIPPINGS: &str = "shippings";
pub const CF_TAXES: &str = "taxes";
/// Keyed by `cart_key`, so one cart's lines are contiguous.
pub const CF_CART_LINES: &str = "cart_lines";
/// `item_id` to the cart holding it.
pub const CF_CART_ITEMS: &str = "cart_items";
pub const CF_ORDERS: &str = "orders";
/// Keyed by `order_id ++ item_id`, so one order's rows are contiguous.
pub const CF_ORDER_DETAILS: &str = "order_details";
/// Empty values keyed by `customer_id ++ order_id`.
pub const CF_CUSTOMER_ORDERS: &str = "customer_orders";
/// Id sequences.
pub const CF_META: &str = "meta";

const COLUMN_FAMILIES: [&str; 9] = [
    CF_PRODUCTS,
    CF_SHIPPINGS,
    CF_TAXES,
    CF_CART_LINES,
    CF_CART_ITEMS,
    CF_ORDERS,
    CF_ORDER_DETAILS,
    CF_CUSTOMER_ORDERS,
    CF_META,
];

const LAST_ITEM_ID: &[u8] = b"last_item_id";
const LAST_ORDER_ID: &[u8] = b"last_order_id";

/// A persistent store implementation using RocksDB.
///
/// Each table lives in its own column family. Writes that touch more than one
/// row (order header plus details) go through a single `WriteBatch`, and
/// read-modify-write sequences are serialized by `write_lock`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CheckoutError::internal(format!("column family {name} not found")))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// Entries whose keys start with `prefix`, in key order.
    fn scan_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self.cf(cf_name)?;
        let mut entries = Vec::new();
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            entries.push((key, value));
        }
        Ok(entries)
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<T>> {
        self.scan_prefix(cf_name, prefix)?
            .iter()
            .map(|(_, value)| Ok(serde_json::from_slice(value)?))
            .collect()
    }

    /// Looks a cart line up through the `cart_items` index.
    fn line(&self, item_id: ItemId) -> Result<Option<CartLine>> {
        let cf = self.cf(CF_CART_ITEMS)?;
        let Some(cart_id) = self.db.get_cf(cf, item_id.to_be_bytes())? else {
            return Ok(None);
        };
        let cart_id = String::from_utf8(cart_id)
            .map_err(|_| CheckoutError::internal(format!("corrupt cart index for item {item_id}")))?;
        self.get_json(CF_CART_LINES, &cart_key(&cart_id, item_id))
    }

    fn last_id(&self, key: &[u8]) -> Result<u64> {
        let cf = self.cf(CF_META)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| CheckoutError::internal("corrupt id sequence"))?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(0),
        }
    }
}

/// Length-prefixed so that no cart id's keys are a prefix of another's.
fn cart_prefix(cart_id: &str) -> Vec<u8> {
    let mut key = (cart_id.len() as u32).to_be_bytes().to_vec();
    key.extend_from_slice(cart_id.as_bytes());
    key
}

fn cart_key(cart_id: &str, item_id: ItemId) -> Vec<u8> {
    let mut key = cart_prefix(cart_id);
    key.extend_from_slice(&item_id.to_be_bytes());
    key
}

fn customer_order_key(customer_id: CustomerId, order_id: OrderId) -> Vec<u8> {
    let mut key = customer_id.to_be_bytes().to_vec();
    key.extend_from_slice(&order_id.to_be_bytes());
    key
}

fn detail_key(order_id: OrderId, item_id: ItemId) -> Vec<u8> {
    let mut key = order_id.to_be_bytes().to_vec();
    key.extend_from_slice(&item_id.to_be_bytes());
    key
}

#[async_trait]
impl CatalogStore for RocksDBStore {
    async fn store_product(&self, product: Product) -> Result<()> {
        self.put_json(CF_PRODUCTS, &product.product_id.to_be_bytes(), &product)
    }

    async fn product(&self, product_id: ProductId) -> Result<Option<Product>> {
        self.get_json(CF_PRODUCTS, &product_id.to_be_bytes())
    }

    async fn store_shipping(&self, shipping: Shipping) -> Result<()> {
        self.put_json(CF_SHIPPINGS, &shipping.shipping_id.to_be_bytes(), &shipping)
    }

    async fn shipping(&self, shipping_id: ShippingId) -> Result<Option<Shipping>> {
        self.get_json(CF_SHIPPINGS, &shipping_id.to_be_bytes())
    }

    async fn store_tax(&self, tax: Tax) -> Result<()> {
        self.put_json(CF_TAXES, &tax.tax_id.to_be_bytes(), &tax)
    }

    async fn tax(&self, tax_id: TaxId) -> Result<Option<Tax>> {
        self.get_json(CF_TAXES, &tax_id.to_be_bytes())
    }

    async fn taxes(&self) -> Result<Vec<Tax>> {
        self.scan_json(CF_TAXES, &[])
    }
}

#[async_trait]
impl CartStore for RocksDBStore {
    async fn insert_line(&self, line: NewCartLine) -> Result<CartLine> {
        let _guard = self.write_lock.lock().await;
        let item_id = self.last_id(LAST_ITEM_ID)? + 1;
        let created = CartLine {
            item_id,
            cart_id: line.cart_id,
            product_id: line.product_id,
            attributes: line.attributes,
            quantity: line.quantity,
        };

        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_CART_LINES)?,
            cart_key(&created.cart_id, item_id),
            serde_json::to_vec(&created)?,
        );
        batch.put_cf(
            self.cf(CF_CART_ITEMS)?,
            item_id.to_be_bytes(),
            created.cart_id.as_bytes(),
        );
        batch.put_cf(self.cf(CF_META)?, LAST_ITEM_ID, item_id.to_be_bytes());
        self.db.write(batch)?;

        Ok(created)
    }

    async fn priced_lines(&self, cart_id: CartId) -> Result<Vec<PricedCartLine>> {
        let lines: Vec<CartLine> = self.scan_json(CF_CART_LINES, &cart_prefix(&cart_id))?;
        let mut priced = Vec::new();
        for line in lines {
            if let Some(product) = self.product(line.product_id).await? {
                priced.push(PricedCartLine {
                    product_name: product.name.clone(),
                    prices: product.price_snapshot(),
                    line,
                });
            }
        }
        Ok(priced)
    }

    async fn update_quantity(&self, item_id: ItemId, quantity: Quantity) -> Result<Option<CartLine>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut line) = self.line(item_id)? else {
            return Ok(None);
        };
        line.quantity = quantity;
        self.put_json(CF_CART_LINES, &cart_key(&line.cart_id, item_id), &line)?;
        Ok(Some(line))
    }

    async fn remove_line(&self, item_id: ItemId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(line) = self.line(item_id)? else {
            return Ok(false);
        };

        let mut batch = WriteBatch::default();
        batch.delete_cf(self.cf(CF_CART_LINES)?, cart_key(&line.cart_id, item_id));
        batch.delete_cf(self.cf(CF_CART_ITEMS)?, item_id.to_be_bytes());
        self.db.write(batch)?;
        Ok(true)
    }

    async fn clear(&self, cart_id: CartId) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let lines: Vec<CartLine> = self.scan_json(CF_CART_LINES, &cart_prefix(&cart_id))?;
        let lines_cf = self.cf(CF_CART_LINES)?;
        let items_cf = self.cf(CF_CART_ITEMS)?;

        let mut batch = WriteBatch::default();
        for line in &lines {
            batch.delete_cf(lines_cf, cart_key(&cart_id, line.item_id));
            batch.delete_cf(items_cf, line.item_id.to_be_bytes());
        }
        self.db.write(batch)?;
        Ok(lines.len())
    }
}

#[async_trait]
impl OrderStore for RocksDBStore {
    async fn create_order(&self, order: NewOrder, details: Vec<NewOrderDetail>) -> Result<Order> {
        let _guard = self.write_lock.lock().await;
        let order_id = self.last_id(LAST_ORDER_ID)? + 1;

        let created = Order {
            order_id,
            customer_id: order.customer_id,
            shipping_id: order.shipping_id,
            tax_id: order.tax_id,
            total_amount: order.total_amount,
            status: OrderStatus::Unpaid,
            created_on: Timestamp::now(),
            shipped_on: None,
            reference: None,
        };

        let details_cf = self.cf(CF_ORDER_DETAILS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_ORDERS)?,
            order_id.to_be_bytes(),
            serde_json::to_vec(&created)?,
        );
        for detail in details {
            let detail = detail.into_detail(order_id);
            batch.put_cf(
                details_cf,
                detail_key(order_id, detail.item_id),
                serde_json::to_vec(&detail)?,
            );
        }
        batch.put_cf(
            self.cf(CF_CUSTOMER_ORDERS)?,
            customer_order_key(created.customer_id, order_id),
            b"",
        );
        batch.put_cf(self.cf(CF_META)?, LAST_ORDER_ID, order_id.to_be_bytes());
        self.db.write(batch)?;

        Ok(created)
    }

    async fn order(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, &order_id.to_be_bytes())
    }

    async fn details(&self, order_id: OrderId) -> Result<Vec<OrderDetail>> {
        self.scan_json(CF_ORDER_DETAILS, &order_id.to_be_bytes())
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let mut orders = Vec::new();
        for (key, _) in self.scan_prefix(CF_CUSTOMER_ORDERS, &customer_id.to_be_bytes())? {
            let raw: [u8; 8] = key[key.len().saturating_sub(8)..]
                .try_into()
                .map_err(|_| CheckoutError::internal("corrupt customer order index"))?;
            if let Some(order) = self.order(OrderId::from_be_bytes(raw)).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    async fn transition_status(&self, change: StatusChange) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let Some(mut order) = self.order(change.order_id).await? else {
            return Ok(false);
        };
        if order.customer_id != change.customer_id || order.status != change.from {
            return Ok(false);
        }

        order.status = change.to;
        if change.reference.is_some() {
            order.reference = change.reference;
        }
        self.put_json(CF_ORDERS, &change.order_id.to_be_bytes(), &order)?;
        Ok(true)
    }
}
