use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::sync::Arc;
use storefront::application::cart::CartService;
use storefront::application::engine::{Collaborators, Storefront};
use storefront::application::settlement::{SettleRequest, SettlementOutcome};
use storefront::config::Cli;
use storefront::domain::notification::Recipient;
use storefront::domain::ports::{CartStoreHandle, CatalogStoreHandle, OrderStoreHandle};
use storefront::infrastructure::gateway::SandboxGateway;
use storefront::infrastructure::in_memory::InMemoryStore;
use storefront::infrastructure::mailer::LogMailer;
use storefront::interfaces::csv::cart_reader::CartReader;
use storefront::interfaces::csv::catalog_reader::{load_customers, seed_catalog};
use storefront::interfaces::csv::order_writer::OrderWriter;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type Stores = (CatalogStoreHandle, CartStoreHandle, OrderStoreHandle);

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn in_memory_stores() -> Stores {
    let store = Arc::new(InMemoryStore::new());
    let catalog: CatalogStoreHandle = store.clone();
    let carts: CartStoreHandle = store.clone();
    let orders: OrderStoreHandle = store;
    (catalog, carts, orders)
}

fn open_stores(cli: &Cli) -> Result<Stores> {
    let Some(db_path) = &cli.db_path else {
        return Ok(in_memory_stores());
    };

    #[cfg(feature = "storage-rocksdb")]
    {
        let store = Arc::new(
            storefront::infrastructure::rocksdb::RocksDBStore::open(db_path).into_diagnostic()?,
        );
        info!(path = %db_path.display(), "using persistent storage");
        let catalog: CatalogStoreHandle = store.clone();
        let carts: CartStoreHandle = store.clone();
        let orders: OrderStoreHandle = store;
        Ok((catalog, carts, orders))
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    {
        warn!(
            path = %db_path.display(),
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
        Ok(in_memory_stores())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let (catalog, carts, orders) = open_stores(&cli)?;
    seed_catalog(&cli.catalog, &catalog).await.into_diagnostic()?;
    let identity = load_customers(&cli.catalog).into_diagnostic()?;

    let storefront = Storefront::new(
        Collaborators {
            catalog,
            carts,
            orders,
            gateway: Arc::new(SandboxGateway::new()),
            mailer: Arc::new(LogMailer::new()),
            identity: Arc::new(identity),
        },
        cli.settlement_options(),
    );

    let customer = storefront
        .authenticate(&cli.credential())
        .await
        .into_diagnostic()?;

    // Fill the cart
    let cart_id = cli
        .cart_id
        .clone()
        .unwrap_or_else(CartService::generate_cart_id);
    let file = File::open(&cli.cart).into_diagnostic()?;
    for row in CartReader::new(file).rows() {
        match row {
            Ok(row) => {
                if let Err(e) = storefront.carts.add_item(row.into_line(&cart_id)).await {
                    warn!(error = %e, "skipping cart line");
                }
            }
            Err(e) => warn!(error = %e, "skipping malformed cart row"),
        }
    }

    let order_id = storefront
        .checkout
        .create_order(&cart_id, cli.shipping_id, cli.tax_id, customer.customer_id)
        .await
        .into_diagnostic()?;

    // Charge, but print the order either way
    let settled = match &cli.charge_token {
        Some(token) => {
            let result = storefront
                .payments
                .settle(SettleRequest {
                    order_id,
                    customer_id: customer.customer_id,
                    charge_token: token.clone(),
                    description: cli.description.clone(),
                    recipient: Recipient {
                        email: customer.email.clone(),
                        name: customer.name.clone(),
                    },
                })
                .await;
            match &result {
                Ok(SettlementOutcome::Paid(receipt)) => {
                    info!(order_id, charge_id = %receipt.charge_id, "payment settled");
                }
                Ok(SettlementOutcome::NotificationFailed { receipt, reason }) => {
                    warn!(order_id, charge_id = %receipt.charge_id, %reason, "payment settled without confirmation mail");
                }
                Err(e) => error!(order_id, error = %e, "payment not settled"),
            }
            result.map(|_| ())
        }
        None => Ok(()),
    };

    let summary = storefront
        .checkout
        .order_summary(order_id, customer.customer_id)
        .await
        .into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_summary(&summary).into_diagnostic()?;

    settled.into_diagnostic()
}
