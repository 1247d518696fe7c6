use super::records;
use crate::domain::cart::NewCartLine;
use crate::domain::catalog::ProductId;
use crate::domain::money::Quantity;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

/// One `product_id, attributes, quantity` row of a cart file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CartRow {
    pub product_id: ProductId,
    #[serde(default)]
    pub attributes: String,
    pub quantity: Quantity,
}

impl CartRow {
    pub fn into_line(self, cart_id: &str) -> NewCartLine {
        NewCartLine {
            cart_id: cart_id.to_string(),
            product_id: self.product_id,
            attributes: self.attributes,
            quantity: self.quantity,
        }
    }
}

/// Reads cart lines from a CSV source.
///
/// Rows are yielded one at a time, so a malformed row only fails itself.
pub struct CartReader<R: Read> {
    source: R,
}

impl<R: Read> CartReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn rows(self) -> impl Iterator<Item = Result<CartRow>> {
        records(self.source)
    }
}
