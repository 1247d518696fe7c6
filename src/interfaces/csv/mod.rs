//! CSV adapters: seed files and cart lines in, order summaries out.

pub mod cart_reader;
pub mod catalog_reader;
pub mod order_writer;

use crate::error::{CheckoutError, Result};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Lazily deserializes records from a headed CSV source, trimming whitespace
/// and tolerating short rows.
pub(crate) fn records<T, R>(source: R) -> impl Iterator<Item = Result<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .flexible(true)
        .from_reader(source)
        .into_deserialize()
        .map(|result| result.map_err(CheckoutError::from))
}
