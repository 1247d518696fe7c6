use super::records;
use crate::domain::catalog::{Product, Shipping, Tax};
use crate::domain::identity::Identity;
use crate::domain::order::CustomerId;
use crate::domain::ports::CatalogStoreHandle;
use crate::error::{CheckoutError, Result};
use crate::infrastructure::identity::StaticIdentityVerifier;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub const PRODUCTS_FILE: &str = "products.csv";
pub const SHIPPING_FILE: &str = "shipping.csv";
pub const TAXES_FILE: &str = "taxes.csv";
pub const CUSTOMERS_FILE: &str = "customers.csv";

/// A `customers.csv` row: who an API key belongs to.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CustomerRecord {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
    pub api_key: String,
    #[serde(default)]
    pub expires_at: Option<Timestamp>,
}

impl CustomerRecord {
    pub fn identity(&self) -> Identity {
        Identity {
            customer_id: self.customer_id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

pub fn products<R: Read>(source: R) -> impl Iterator<Item = Result<Product>> {
    records(source)
}

pub fn shippings<R: Read>(source: R) -> impl Iterator<Item = Result<Shipping>> {
    records(source)
}

/// Tax rows; a negative percentage fails its row.
pub fn taxes<R: Read>(source: R) -> impl Iterator<Item = Result<Tax>> {
    records::<Tax, R>(source).map(|result| {
        let tax = result?;
        if tax.tax_percentage < Decimal::ZERO {
            return Err(CheckoutError::ValidationError(format!(
                "tax {} has a negative percentage",
                tax.tax_id
            )));
        }
        Ok(tax)
    })
}

pub fn customers<R: Read>(source: R) -> impl Iterator<Item = Result<CustomerRecord>> {
    records(source)
}

/// Row counts loaded by [`seed_catalog`].
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub struct SeedReport {
    pub products: usize,
    pub shippings: usize,
    pub taxes: usize,
}

/// Loads `products.csv`, `shipping.csv` and `taxes.csv` from `dir` into the
/// catalog. Any malformed row aborts the load.
pub async fn seed_catalog(dir: &Path, catalog: &CatalogStoreHandle) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for product in products(File::open(dir.join(PRODUCTS_FILE))?) {
        catalog.store_product(product?).await?;
        report.products += 1;
    }
    for shipping in shippings(File::open(dir.join(SHIPPING_FILE))?) {
        catalog.store_shipping(shipping?).await?;
        report.shippings += 1;
    }
    for tax in taxes(File::open(dir.join(TAXES_FILE))?) {
        catalog.store_tax(tax?).await?;
        report.taxes += 1;
    }

    info!(
        products = report.products,
        shippings = report.shippings,
        taxes = report.taxes,
        "catalog seeded"
    );
    Ok(report)
}

/// Builds a verifier from `customers.csv` in `dir`.
pub fn load_customers(dir: &Path) -> Result<StaticIdentityVerifier> {
    let mut verifier = StaticIdentityVerifier::new();
    for record in customers(File::open(dir.join(CUSTOMERS_FILE))?) {
        let record = record?;
        verifier.register(&record.api_key, record.identity(), record.expires_at);
    }
    info!(customers = verifier.len(), "customers loaded");
    Ok(verifier)
}
