//! Application layer: the checkout workflow.
//!
//! `CartService` reads and edits carts, `CheckoutService` prices carts and
//! writes orders, and `PaymentSettler` charges and records payment. `Storefront`
//! bundles them over one set of collaborator handles.

pub mod cart;
pub mod checkout;
pub mod engine;
pub mod settlement;
