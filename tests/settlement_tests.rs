mod common;

use async_trait::async_trait;
use common::{fixture, fixture_with_orders};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use storefront::application::cart::CartService;
use storefront::application::settlement::{SettleRequest, SettlementOutcome};
use storefront::domain::cart::NewCartLine;
use storefront::domain::money::{Money, Quantity};
use storefront::domain::notification::Recipient;
use storefront::domain::order::{
    CustomerId, NewOrder, NewOrderDetail, Order, OrderDetail, OrderId, OrderStatus, StatusChange,
};
use storefront::domain::payment::ChargeRequest;
use storefront::domain::ports::{OrderStore, PaymentGateway};
use storefront::error::{CheckoutError, PartialFailure, Result};
use storefront::infrastructure::gateway::DECLINED_TOKEN;
use storefront::infrastructure::in_memory::InMemoryStore;

async fn place_order(f: &common::Fixture) -> OrderId {
    let cart_id = CartService::generate_cart_id();
    for (product_id, quantity) in [(1, 1), (2, 2)] {
        f.storefront
            .carts
            .add_item(NewCartLine {
                cart_id: cart_id.clone(),
                product_id,
                attributes: String::new(),
                quantity: Quantity::new(quantity).unwrap(),
            })
            .await
            .unwrap();
    }
    f.storefront
        .checkout
        .create_order(&cart_id, 1, 1, 7)
        .await
        .unwrap()
}

fn settle_request(order_id: OrderId, customer_id: CustomerId, token: &str) -> SettleRequest {
    SettleRequest {
        order_id,
        customer_id,
        charge_token: token.to_string(),
        description: format!("order {order_id}"),
        recipient: Recipient {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
        },
    }
}

#[tokio::test]
async fn test_settle_charges_total_in_cents_and_marks_paid() {
    let f = fixture().await;
    let order_id = place_order(&f).await;

    let outcome = f
        .storefront
        .payments
        .settle(settle_request(order_id, 7, "tok_visa"))
        .await
        .unwrap();
    let receipt = match outcome {
        SettlementOutcome::Paid(receipt) => receipt,
        other => panic!("expected paid, got {other:?}"),
    };
    assert_eq!(receipt.amount_minor, 2530);
    assert_eq!(receipt.currency, "usd");

    let charge = f
        .gateway
        .charge_for(ChargeRequest::idempotency_key_for(order_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(charge.amount_minor, 2530);

    let order = f.store.order(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.reference, Some(receipt.charge_id));

    let sent = f.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Thank you for shopping with us");
    assert!(sent[0].body.contains("Ada"));
}

#[tokio::test]
async fn test_declined_charge_keeps_order_unpaid_and_retryable() {
    let f = fixture().await;
    let order_id = place_order(&f).await;

    let result = f
        .storefront
        .payments
        .settle(settle_request(order_id, 7, DECLINED_TOKEN))
        .await;
    assert!(matches!(result, Err(CheckoutError::PaymentFailed { .. })));

    let order = f.store.order(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Unpaid);
    assert!(order.reference.is_none());
    assert!(f.mailer.sent().await.is_empty());
    assert_eq!(f.gateway.charge_count().await, 0);

    let retry = f
        .storefront
        .payments
        .settle(settle_request(order_id, 7, "tok_visa"))
        .await;
    assert!(retry.is_ok());
}

#[tokio::test]
async fn test_concurrent_settlements_charge_once() {
    let f = fixture().await;
    let order_id = place_order(&f).await;

    let first = f.storefront.payments.clone();
    let second = f.storefront.payments.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { first.settle(settle_request(order_id, 7, "tok_visa")).await }),
        tokio::spawn(async move { second.settle(settle_request(order_id, 7, "tok_visa")).await }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let paid = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(CheckoutError::Conflict(_))))
        .count();
    assert_eq!((paid, conflicts), (1, 1));
    assert_eq!(f.gateway.charge_count().await, 1);
    assert_eq!(f.mailer.sent().await.len(), 1);
}

#[tokio::test]
async fn test_paid_order_cannot_be_settled_again() {
    let f = fixture().await;
    let order_id = place_order(&f).await;
    f.storefront
        .payments
        .settle(settle_request(order_id, 7, "tok_visa"))
        .await
        .unwrap();

    let again = f
        .storefront
        .payments
        .settle(settle_request(order_id, 7, "tok_visa"))
        .await;
    assert!(matches!(again, Err(CheckoutError::Conflict(_))));
    assert_eq!(f.gateway.charge_count().await, 1);
}

#[tokio::test]
async fn test_other_customer_cannot_settle() {
    let f = fixture().await;
    let order_id = place_order(&f).await;

    let result = f
        .storefront
        .payments
        .settle(settle_request(order_id, 8, "tok_visa"))
        .await;
    assert!(matches!(result, Err(CheckoutError::NotFound { .. })));
    assert_eq!(f.gateway.charge_count().await, 0);
    assert_eq!(
        f.store.order(order_id).await.unwrap().unwrap().status,
        OrderStatus::Unpaid
    );
}

#[tokio::test]
async fn test_bad_mail_address_still_pays() {
    let f = fixture().await;
    let order_id = place_order(&f).await;
    let mut request = settle_request(order_id, 7, "tok_visa");
    request.recipient.email = "not-an-address".to_string();

    let outcome = f.storefront.payments.settle(request).await.unwrap();
    assert!(matches!(outcome, SettlementOutcome::NotificationFailed { .. }));
    assert_eq!(
        f.store.order(order_id).await.unwrap().unwrap().status,
        OrderStatus::Paid
    );
    assert_eq!(outcome.receipt().amount, Money::new(dec!(25.30)).unwrap());
}

/// Delegates to an in-memory store but refuses to record payment while armed.
struct PaidWriteFails {
    inner: Arc<InMemoryStore>,
    armed: AtomicBool,
}

#[async_trait]
impl OrderStore for PaidWriteFails {
    async fn create_order(&self, order: NewOrder, details: Vec<NewOrderDetail>) -> Result<Order> {
        self.inner.create_order(order, details).await
    }

    async fn order(&self, order_id: OrderId) -> Result<Option<Order>> {
        self.inner.order(order_id).await
    }

    async fn details(&self, order_id: OrderId) -> Result<Vec<OrderDetail>> {
        self.inner.details(order_id).await
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        self.inner.orders_for_customer(customer_id).await
    }

    async fn transition_status(&self, change: StatusChange) -> Result<bool> {
        if change.to == OrderStatus::Paid && self.armed.swap(false, Ordering::SeqCst) {
            return Err(CheckoutError::internal("database went away"));
        }
        self.inner.transition_status(change).await
    }
}

#[tokio::test]
async fn test_charged_but_unrecorded_is_reconciled() {
    let store = Arc::new(InMemoryStore::new());
    let orders = Arc::new(PaidWriteFails {
        inner: store.clone(),
        armed: AtomicBool::new(true),
    });
    let f = fixture_with_orders(store, orders).await;
    let order_id = place_order(&f).await;

    let result = f
        .storefront
        .payments
        .settle(settle_request(order_id, 7, "tok_visa"))
        .await;
    let charge_id = match result {
        Err(CheckoutError::PartialFailure(PartialFailure::ChargedButUnrecorded {
            charge_id,
            ..
        })) => charge_id,
        other => panic!("expected partial failure, got {other:?}"),
    };
    assert_eq!(f.gateway.charge_count().await, 1);
    assert!(f.mailer.sent().await.is_empty());

    // stuck in charging, so a blind retry is refused
    let order = f.store.order(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Charging);
    let retry = f
        .storefront
        .payments
        .settle(settle_request(order_id, 7, "tok_visa"))
        .await;
    assert!(matches!(retry, Err(CheckoutError::Conflict(_))));

    // an id the gateway never issued does not settle the order
    let forged = f
        .storefront
        .payments
        .reconcile_charge(order_id, 7, "ch_made_up")
        .await;
    assert!(matches!(forged, Err(CheckoutError::Conflict(_))));
    let order = f.store.order(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Charging);
    assert!(order.reference.is_none());

    let reconciled = f
        .storefront
        .payments
        .reconcile_charge(order_id, 7, &charge_id)
        .await
        .unwrap();
    assert_eq!(reconciled.status, OrderStatus::Paid);
    assert_eq!(reconciled.reference, Some(charge_id.clone()));

    let again = f
        .storefront
        .payments
        .reconcile_charge(order_id, 7, &charge_id)
        .await
        .unwrap();
    assert_eq!(again, reconciled);
}
