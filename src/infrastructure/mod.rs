//! Adapters behind the domain ports.

pub mod gateway;
pub mod identity;
pub mod in_memory;
pub mod mailer;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
