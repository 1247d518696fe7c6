//! Domain layer: value types, the pricing engine, and the ports the
//! application talks to. Nothing in here performs I/O.

pub mod cart;
pub mod catalog;
pub mod identity;
pub mod money;
pub mod notification;
pub mod order;
pub mod payment;
pub mod ports;
pub mod pricing;
