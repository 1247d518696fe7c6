#![allow(dead_code)]

use std::fs;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use storefront::application::engine::{Collaborators, Storefront};
use storefront::application::settlement::SettlementOptions;
use storefront::domain::ports::OrderStoreHandle;
use storefront::infrastructure::gateway::SandboxGateway;
use storefront::infrastructure::in_memory::InMemoryStore;
use storefront::infrastructure::mailer::LogMailer;
use storefront::interfaces::csv::catalog_reader::{load_customers, seed_catalog};

pub const ADA_KEY: &str = "secret-ada";
pub const BOB_KEY: &str = "secret-bob";
pub const EXPIRED_KEY: &str = "secret-old";

/// Writes a small catalog: two products, two shipping options, two tax
/// rates and three customers, one of them with an expired key.
pub fn write_catalog(dir: &Path) -> Result<(), Error> {
    fs::write(
        dir.join("products.csv"),
        "product_id,name,price,discounted_price\n\
         1,Arc d'Triomphe,10.00,0.00\n\
         2,Chartres Cathedral,9.00,5.00\n\
         3,Coat of Arms,14.50,0.00\n",
    )?;
    fs::write(
        dir.join("shipping.csv"),
        "shipping_id,shipping_type,shipping_cost\n\
         1,Next Day Delivery,3.00\n\
         2,Free Shipping,0.00\n",
    )?;
    fs::write(
        dir.join("taxes.csv"),
        "tax_id,tax_type,tax_percentage\n\
         1,Sales Tax at 10%,10.00\n\
         2,No Tax,0.00\n",
    )?;
    fs::write(
        dir.join("customers.csv"),
        format!(
            "customer_id,name,email,api_key,expires_at\n\
             7,Ada,ada@example.com,{ADA_KEY},\n\
             8,Bob,bob@example.com,{BOB_KEY},\n\
             9,Old,old@example.com,{EXPIRED_KEY},2001-01-01T00:00:00Z\n"
        ),
    )?;
    Ok(())
}

/// Cart file for the worked example: one Arc d'Triomphe and two discounted
/// Chartres Cathedrals. Priced with shipping 1 and tax 1 it totals 25.30.
pub fn write_cart(path: &Path) -> Result<(), Error> {
    fs::write(
        path,
        "product_id,attributes,quantity\n1,\"M, Blue\",1\n2,L,2\n",
    )
}

pub struct Fixture {
    pub storefront: Storefront,
    pub store: Arc<InMemoryStore>,
    pub gateway: Arc<SandboxGateway>,
    pub mailer: Arc<LogMailer>,
    _dir: tempfile::TempDir,
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    fixture_with_orders(store.clone(), store).await
}

/// Like [`fixture`], but orders go through `orders` instead of the shared store.
pub async fn fixture_with_orders(store: Arc<InMemoryStore>, orders: OrderStoreHandle) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path()).unwrap();

    let catalog: storefront::domain::ports::CatalogStoreHandle = store.clone();
    seed_catalog(dir.path(), &catalog).await.unwrap();
    let identity = load_customers(dir.path()).unwrap();

    let gateway = Arc::new(SandboxGateway::new());
    let mailer = Arc::new(LogMailer::new());
    let storefront = Storefront::new(
        Collaborators {
            catalog,
            carts: store.clone(),
            orders,
            gateway: gateway.clone(),
            mailer: mailer.clone(),
            identity: Arc::new(identity),
        },
        SettlementOptions::default(),
    );

    Fixture {
        storefront,
        store,
        gateway,
        mailer,
        _dir: dir,
    }
}
