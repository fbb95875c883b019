//! Order Ledger Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::cart::CartItem;
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::TrackingId;
use crate::{MarketplaceError, Result};

/// 10% flat tax applied on top of the discounted subtotal.
const TAX_MULTIPLIER: Decimal = dec!(1.10);

const PAYMENT_METHOD: &str = "Transfer";

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct CustomerDetails {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub address: String,
}

/// Flat status field. Any status may be set from any status; there is no
/// transition table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Validated,
    Processing,
    Shipped,
    Delivered,
    Rejected,
}

/// Append-only except for `status`. Items are snapshots copied at creation,
/// not live references into the catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: TrackingId,
    pub customer: CustomerDetails,
    pub items: Vec<CartItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub payment_method: String,
}

/// All orders ever created, most recent first.
#[derive(Clone, Debug, Default)]
pub struct OrderLedger {
    orders: Vec<Order>,
    events: Vec<DomainEvent>,
}

impl OrderLedger {
    pub fn new(seed: Vec<Order>) -> Self {
        Self { orders: seed, events: vec![] }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Issues a tracking id (collision-unchecked), computes the taxed total,
    /// and inserts the order at the head of the ledger.
    pub fn create(&mut self, customer: CustomerDetails, items: Vec<CartItem>) -> Order {
        let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
        let order = Order {
            id: TrackingId::generate(),
            customer,
            items,
            total_amount: subtotal * TAX_MULTIPLIER,
            status: OrderStatus::Pending,
            timestamp: Utc::now(),
            payment_method: PAYMENT_METHOD.to_string(),
        };
        self.raise(OrderEvent::Created {
            tracking_id: order.id.clone(),
            total: order.total_amount,
        });
        self.orders.insert(0, order.clone());
        order
    }

    pub fn set_status(&mut self, order_id: &str, status: OrderStatus) -> Result<()> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id.as_str() == order_id)
            .ok_or(MarketplaceError::OrderNotFound)?;
        order.status = status;
        let id = order.id.clone();
        self.raise(OrderEvent::StatusChanged { tracking_id: id, status });
        Ok(())
    }

    /// Unknown ids are skipped silently.
    pub fn set_status_bulk(&mut self, order_ids: &[String], status: OrderStatus) {
        let mut changed = vec![];
        for order in self.orders.iter_mut() {
            if order_ids.iter().any(|id| id == order.id.as_str()) {
                order.status = status;
                changed.push(order.id.clone());
            }
        }
        for tracking_id in changed {
            self.raise(OrderEvent::StatusChanged { tracking_id, status });
        }
    }

    /// Whitespace-trimmed, case-insensitive exact match. `None` carries no
    /// hint about whether a similar id was ever issued.
    pub fn find_by_id(&self, input: &str) -> Option<&Order> {
        let id = TrackingId::normalize(input);
        self.orders.iter().find(|o| o.id.as_str() == id)
    }

    /// Orders visible on the tracking screen: the session customer's orders,
    /// with an explicitly searched order first when it is not among them.
    /// Never contains duplicate ids.
    pub fn visible_for(&self, customer_email: Option<&str>, searched: Option<&Order>) -> Vec<Order> {
        let session: Vec<Order> = customer_email
            .map(|email| {
                self.orders
                    .iter()
                    .filter(|o| o.customer.email == email)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        match searched {
            Some(order) if !session.iter().any(|o| o.id == order.id) => {
                let mut visible = vec![order.clone()];
                visible.extend(session);
                visible
            }
            _ => session,
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn raise(&mut self, event: OrderEvent) {
        self.events.push(DomainEvent::Order(event));
    }
}
