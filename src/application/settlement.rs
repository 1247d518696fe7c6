use crate::domain::money::Money;
use crate::domain::notification::{MailError, Notification, Recipient};
use crate::domain::order::{CustomerId, Order, OrderId, OrderStatus, StatusChange};
use crate::domain::payment::{Charge, ChargeRequest, GatewayError};
use crate::domain::ports::{MailerHandle, OrderStoreHandle, PaymentGatewayHandle};
use crate::error::{CheckoutError, PartialFailure, Result};
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct SettlementOptions {
    pub currency: String,
    pub gateway_timeout: Duration,
    pub mail_timeout: Duration,
}

impl Default for SettlementOptions {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            gateway_timeout: Duration::from_secs(10),
            mail_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettleRequest {
    pub order_id: OrderId,
    /// The verified caller. Authoritative for both the order lookup and the status write.
    pub customer_id: CustomerId,
    pub charge_token: String,
    pub description: String,
    pub recipient: Recipient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub order_id: OrderId,
    pub charge_id: String,
    pub amount: Money,
    pub amount_minor: u64,
    pub currency: String,
}

/// Result of a settlement that took the money and recorded it.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    Paid(Receipt),
    /// Paid and recorded, but the customer could not be told.
    NotificationFailed { receipt: Receipt, reason: MailError },
}

impl SettlementOutcome {
    pub fn receipt(&self) -> &Receipt {
        match self {
            SettlementOutcome::Paid(receipt) => receipt,
            SettlementOutcome::NotificationFailed { receipt, .. } => receipt,
        }
    }
}

/// Charges orders and records the result.
///
/// Each settlement walks `Unpaid -> Charging -> Paid` through compare-and-set
/// writes, so two concurrent attempts on one order cannot both reach the
/// gateway. A declined charge puts the order back to `Unpaid`.
#[derive(Clone)]
pub struct PaymentSettler {
    orders: OrderStoreHandle,
    gateway: PaymentGatewayHandle,
    mailer: MailerHandle,
    options: SettlementOptions,
}

impl PaymentSettler {
    pub fn new(
        orders: OrderStoreHandle,
        gateway: PaymentGatewayHandle,
        mailer: MailerHandle,
        options: SettlementOptions,
    ) -> Self {
        Self {
            orders,
            gateway,
            mailer,
            options,
        }
    }

    pub async fn settle(&self, request: SettleRequest) -> Result<SettlementOutcome> {
        if request.charge_token.trim().is_empty() {
            return Err(CheckoutError::ValidationError(
                "charge token must not be empty".to_string(),
            ));
        }

        let order = self.owned_order(request.order_id, request.customer_id).await?;
        match order.status {
            OrderStatus::Unpaid => {}
            OrderStatus::Paid => {
                return Err(CheckoutError::Conflict(format!(
                    "order {} is already paid",
                    order.order_id
                )));
            }
            OrderStatus::Charging => {
                return Err(CheckoutError::Conflict(format!(
                    "order {} has a charge in flight or awaiting reconciliation",
                    order.order_id
                )));
            }
        }

        let amount_minor = order.total_amount.to_minor_units()?;

        let claimed = self
            .orders
            .transition_status(StatusChange {
                order_id: order.order_id,
                customer_id: request.customer_id,
                from: OrderStatus::Unpaid,
                to: OrderStatus::Charging,
                reference: None,
            })
            .await?;
        if !claimed {
            return Err(CheckoutError::Conflict(format!(
                "order {} is already being settled",
                order.order_id
            )));
        }

        info!(
            order_id = order.order_id,
            customer_id = request.customer_id,
            amount_minor,
            "charging order"
        );

        let charge = match self
            .charge(ChargeRequest {
                amount_minor,
                currency: self.options.currency.clone(),
                description: request.description.clone(),
                source_token: request.charge_token.clone(),
                idempotency_key: ChargeRequest::idempotency_key_for(order.order_id),
            })
            .await
        {
            Ok(charge) => charge,
            Err(reason) => {
                warn!(order_id = order.order_id, %reason, "charge failed");
                if let Err(source) = self.release(&order, request.customer_id).await {
                    error!(
                        order_id = order.order_id,
                        %source,
                        "order could not be returned to unpaid after a failed charge"
                    );
                    return Err(PartialFailure::DeclinedButNotReleased {
                        order_id: order.order_id,
                        reason: reason.to_string(),
                        source: Box::new(source),
                    }
                    .into());
                }
                return Err(CheckoutError::PaymentFailed {
                    order_id: order.order_id,
                    reason: reason.to_string(),
                });
            }
        };

        let recorded = self
            .orders
            .transition_status(StatusChange {
                order_id: order.order_id,
                customer_id: request.customer_id,
                from: OrderStatus::Charging,
                to: OrderStatus::Paid,
                reference: Some(charge.charge_id.clone()),
            })
            .await;
        match recorded {
            Ok(true) => {}
            Ok(false) => {
                // a concurrent reconcile may have recorded this very charge
                let reconciled = self
                    .paid_with(order.order_id, request.customer_id, &charge.charge_id)
                    .await;
                if reconciled.is_none() {
                    return Err(self.unrecorded(
                        &order,
                        &charge,
                        CheckoutError::Conflict("order left the charging state".to_string()),
                    ));
                }
            }
            Err(source) => return Err(self.unrecorded(&order, &charge, source)),
        }

        let receipt = Receipt {
            order_id: order.order_id,
            charge_id: charge.charge_id,
            amount: order.total_amount,
            amount_minor: charge.amount_minor,
            currency: charge.currency,
        };
        info!(order_id = order.order_id, charge_id = %receipt.charge_id, "order paid");

        match self
            .notify(Notification::purchase_confirmation(request.recipient))
            .await
        {
            Ok(()) => Ok(SettlementOutcome::Paid(receipt)),
            Err(reason) => {
                warn!(order_id = order.order_id, %reason, "payment confirmation not delivered");
                Ok(SettlementOutcome::NotificationFailed { receipt, reason })
            }
        }
    }

    /// Marks an order stuck in `Charging` as paid with the gateway's charge id.
    ///
    /// The gateway must hold a completed charge for the order under its
    /// idempotency key, with the same id and the order's amount. An order whose
    /// charge is still in flight has none, so it is refused. Calling it again
    /// once the order is paid returns the order unchanged.
    pub async fn reconcile_charge(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        charge_id: &str,
    ) -> Result<Order> {
        let order = self.owned_order(order_id, customer_id).await?;
        match order.status {
            OrderStatus::Paid => return Ok(order),
            OrderStatus::Unpaid => {
                return Err(CheckoutError::Conflict(format!(
                    "order {order_id} has no charge to reconcile"
                )));
            }
            OrderStatus::Charging => {}
        }

        self.verify_charge(&order, charge_id).await?;

        let applied = self
            .orders
            .transition_status(StatusChange {
                order_id,
                customer_id,
                from: OrderStatus::Charging,
                to: OrderStatus::Paid,
                reference: Some(charge_id.to_string()),
            })
            .await?;
        if !applied {
            return match self.paid_with(order_id, customer_id, charge_id).await {
                Some(order) => Ok(order),
                None => Err(CheckoutError::Conflict(format!(
                    "order {order_id} changed while reconciling"
                ))),
            };
        }

        info!(order_id, charge_id, "charge reconciled");
        self.owned_order(order_id, customer_id).await
    }

    async fn owned_order(&self, order_id: OrderId, customer_id: CustomerId) -> Result<Order> {
        match self.orders.order(order_id).await? {
            Some(order) if order.customer_id == customer_id => Ok(order),
            _ => Err(CheckoutError::not_found("order", order_id)),
        }
    }

    async fn charge(&self, request: ChargeRequest) -> std::result::Result<Charge, GatewayError> {
        let timeout = self.options.gateway_timeout;
        match tokio::time::timeout(timeout, self.gateway.charge(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(millis(timeout))),
        }
    }

    async fn notify(&self, notification: Notification) -> std::result::Result<(), MailError> {
        let timeout = self.options.mail_timeout;
        match tokio::time::timeout(timeout, self.mailer.send(notification)).await {
            Ok(result) => result,
            Err(_) => Err(MailError::Timeout(millis(timeout))),
        }
    }

    /// Checks `charge_id` against what the gateway holds for the order.
    async fn verify_charge(&self, order: &Order, charge_id: &str) -> Result<()> {
        let key = ChargeRequest::idempotency_key_for(order.order_id);
        let timeout = self.options.gateway_timeout;
        let found = match tokio::time::timeout(timeout, self.gateway.charge_for(key)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(millis(timeout))),
        }
        .map_err(|e| {
            CheckoutError::internal(format!(
                "charge for order {} could not be looked up: {e}",
                order.order_id
            ))
        })?;

        let Some(charge) = found else {
            return Err(CheckoutError::Conflict(format!(
                "order {} has no completed charge at the gateway",
                order.order_id
            )));
        };
        if charge.charge_id != charge_id {
            return Err(CheckoutError::Conflict(format!(
                "charge {charge_id} does not belong to order {}",
                order.order_id
            )));
        }
        let expected = order.total_amount.to_minor_units()?;
        if charge.amount_minor != expected {
            return Err(CheckoutError::Conflict(format!(
                "charge {charge_id} is for {} minor units, order {} totals {expected}",
                charge.amount_minor, order.order_id
            )));
        }
        Ok(())
    }

    /// The order, if it is already paid with `charge_id`.
    async fn paid_with(
        &self,
        order_id: OrderId,
        customer_id: CustomerId,
        charge_id: &str,
    ) -> Option<Order> {
        match self.orders.order(order_id).await {
            Ok(Some(order))
                if order.customer_id == customer_id
                    && order.status == OrderStatus::Paid
                    && order.reference.as_deref() == Some(charge_id) =>
            {
                Some(order)
            }
            _ => None,
        }
    }

    /// Puts a claimed order back to `Unpaid` after a failed charge.
    async fn release(&self, order: &Order, customer_id: CustomerId) -> Result<()> {
        let released = self
            .orders
            .transition_status(StatusChange {
                order_id: order.order_id,
                customer_id,
                from: OrderStatus::Charging,
                to: OrderStatus::Unpaid,
                reference: None,
            })
            .await?;
        if released {
            Ok(())
        } else {
            Err(CheckoutError::Conflict(format!(
                "order {} left the charging state",
                order.order_id
            )))
        }
    }

    fn unrecorded(&self, order: &Order, charge: &Charge, source: CheckoutError) -> CheckoutError {
        error!(
            order_id = order.order_id,
            charge_id = %charge.charge_id,
            %source,
            "charge taken but order status not recorded"
        );
        PartialFailure::ChargedButUnrecorded {
            order_id: order.order_id,
            charge_id: charge.charge_id.clone(),
            source: Box::new(source),
        }
        .into()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
