//! Domain events
//!
//! Raised by the aggregates and drained by the application root, which logs
//! them. There is no external bus in this demo.

use crate::domain::aggregates::order::OrderStatus;
use crate::domain::value_objects::TrackingId;
use rust_decimal::Decimal;

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Order(OrderEvent),
    Support(SupportEvent),
}

#[derive(Clone, Debug)]
pub enum OrderEvent {
    Created { tracking_id: TrackingId, total: Decimal },
    StatusChanged { tracking_id: TrackingId, status: OrderStatus },
}

#[derive(Clone, Debug)]
pub enum SupportEvent {
    Escalated,
    Resolved { archived_messages: usize },
}
