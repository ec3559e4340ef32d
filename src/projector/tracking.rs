//! # Order Status Projector
//!
//! Turns an order's status into the five milestones of the tracking timeline.
//!
//! Completion follows a rank table (`pending < processing < shipped < delivered`).
//! Upstream has no distinct "out for delivery" status, so *Out for Delivery* and
//! *Delivered* both require `delivered` and complete together. If the backend
//! gains such a status, extend [`status_rank`] and the step table below; nothing
//! else needs to change.

use crate::model::{Order, OrderStatus, ReturnRequest, ReturnStatus, ReturnType};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const ORDER_PLACED: &str = "Order Placed";
pub const PROCESSING: &str = "Processing";
pub const SHIPPED: &str = "Shipped";
pub const OUT_FOR_DELIVERY: &str = "Out for Delivery";
pub const DELIVERED: &str = "Delivered";

/// One milestone of the tracking timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingStep {
    pub label: &'static str,
    pub completed: bool,
    /// Only the first and last steps ever carry one; the backend does not report
    /// per-transition times.
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Requirement {
    AtLeast(u8),
    Exactly(OrderStatus),
}

const STEPS: [(&str, Requirement); 5] = [
    (ORDER_PLACED, Requirement::AtLeast(0)),
    (PROCESSING, Requirement::AtLeast(1)),
    (SHIPPED, Requirement::AtLeast(2)),
    (OUT_FOR_DELIVERY, Requirement::Exactly(OrderStatus::Delivered)),
    (DELIVERED, Requirement::Exactly(OrderStatus::Delivered)),
];

/// Position of a status in the fulfilment order. Cancelled orders never
/// progressed past placement.
pub fn status_rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Pending | OrderStatus::Cancelled => 0,
        OrderStatus::Processing => 1,
        OrderStatus::Shipped => 2,
        OrderStatus::Delivered => 3,
    }
}

/// Tracking steps for an order.
pub fn project(order: &Order) -> [TrackingStep; 5] {
    project_status(order.status(), order.created_at)
}

/// Tracking steps for a status and placement time.
pub fn project_status(status: OrderStatus, created_at: DateTime<Utc>) -> [TrackingStep; 5] {
    let rank = status_rank(status);
    STEPS.map(|(label, requirement)| {
        let completed = match requirement {
            Requirement::AtLeast(min) => rank >= min,
            Requirement::Exactly(required) => status == required,
        };
        let timestamp = match label {
            ORDER_PLACED => Some(format_placed(created_at)),
            DELIVERED if completed => Some(DELIVERED.to_string()),
            _ => None,
        };
        TrackingStep {
            label,
            completed,
            timestamp,
        }
    })
}

fn format_placed(created_at: DateTime<Utc>) -> String {
    created_at.format("%b %-d, %Y").to_string()
}

/// Which tab of the orders screen an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DisplayBucket {
    /// Anything not yet delivered, including cancelled orders.
    Active,
    Delivered,
    /// Delivered, with a return the backend has accepted.
    Returned,
}

/// Classifies an order given the return requests known for the user.
pub fn display_bucket(order: &Order, returns: &[ReturnRequest]) -> DisplayBucket {
    if !order.is_delivered() {
        return DisplayBucket::Active;
    }
    let returned = returns.iter().any(|request| {
        request.order_id == order.id
            && request.return_type == ReturnType::Return
            && matches!(
                request.status,
                ReturnStatus::Approved | ReturnStatus::Processing | ReturnStatus::Completed
            )
    });
    if returned {
        DisplayBucket::Returned
    } else {
        DisplayBucket::Delivered
    }
}
