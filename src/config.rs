use crate::application::settlement::SettlementOptions;
use crate::domain::catalog::{ShippingId, TaxId};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command line and environment configuration for the storefront binary.
///
/// Every option can also be supplied through its `STOREFRONT_*` variable.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Checks out a cart and settles its payment", long_about = None)]
pub struct Cli {
    /// Cart lines CSV file (product_id,attributes,quantity)
    #[arg(env = "STOREFRONT_CART")]
    pub cart: PathBuf,

    /// Directory holding products.csv, shipping.csv, taxes.csv and customers.csv
    #[arg(long, env = "STOREFRONT_CATALOG", default_value = "catalog")]
    pub catalog: PathBuf,

    /// API key of the customer checking out
    #[arg(long, env = "STOREFRONT_API_KEY")]
    pub api_key: String,

    #[arg(long, env = "STOREFRONT_SHIPPING_ID")]
    pub shipping_id: ShippingId,

    #[arg(long, env = "STOREFRONT_TAX_ID")]
    pub tax_id: TaxId,

    /// Cart to fill; a fresh one is generated when omitted
    #[arg(long, env = "STOREFRONT_CART_ID")]
    pub cart_id: Option<String>,

    /// Payment source token. Without it the order is created but not charged.
    #[arg(long, env = "STOREFRONT_CHARGE_TOKEN")]
    pub charge_token: Option<String>,

    /// Description attached to the charge
    #[arg(long, env = "STOREFRONT_DESCRIPTION", default_value = "Storefront order")]
    pub description: String,

    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "usd")]
    pub currency: String,

    #[arg(long, env = "STOREFRONT_GATEWAY_TIMEOUT_MS", default_value_t = 10_000)]
    pub gateway_timeout_ms: u64,

    #[arg(long, env = "STOREFRONT_MAIL_TIMEOUT_MS", default_value_t = 10_000)]
    pub mail_timeout_ms: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "STOREFRONT_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "STOREFRONT_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

impl Cli {
    pub fn credential(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    pub fn settlement_options(&self) -> SettlementOptions {
        SettlementOptions {
            currency: self.currency.to_lowercase(),
            gateway_timeout: Duration::from_millis(self.gateway_timeout_ms),
            mail_timeout: Duration::from_millis(self.mail_timeout_ms),
        }
    }
}
