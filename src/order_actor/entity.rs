//! [`ActorEntity`] implementation for orders held by the in-process backend.

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::framework::ActorEntity;
use crate::model::{Eligibility, Order, OrderItem, OrderStatus};
use crate::projector::{self, Totals};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Returns are accepted for this many days after delivery.
pub const RETURN_WINDOW_DAYS: i64 = 7;

/// Type-safe identifier for orders. Rendered as `order_<n>` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("order_")
            .and_then(|n| n.parse().ok())
            .map(OrderId)
            .ok_or_else(|| OrderError::NotFound(s.to_string()))
    }
}

/// An order as stored by the in-process backend.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub totals: Totals,
    pub address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub address: String,
    pub placed_at: DateTime<Utc>,
}

impl OrderCreate {
    /// Checks the payload the same way creation does, without touching the actor.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::ValidationError("order has no items".into()));
        }
        if let Some(item) = self.items.iter().find(|item| item.quantity == 0) {
            return Err(OrderError::ValidationError(format!(
                "quantity for {} must be at least 1",
                item.product_id
            )));
        }
        if self.address.trim().is_empty() {
            return Err(OrderError::ValidationError("address is required".into()));
        }
        Ok(())
    }
}

impl OrderRecord {
    /// The order as the storefront receives it.
    pub fn to_wire(&self) -> Order {
        Order {
            id: self.id.to_string(),
            status: Some(self.status.as_str().to_string()),
            created_at: self.created_at,
            order_items: self.items.clone(),
            subtotal: self.totals.subtotal,
            shipping: self.totals.shipping,
            total: self.totals.total,
            address: self.address.clone(),
        }
    }

    /// Cancel before shipment; return within [`RETURN_WINDOW_DAYS`] of delivery.
    pub fn eligibility(&self, now: DateTime<Utc>) -> Eligibility {
        match self.status {
            OrderStatus::Pending | OrderStatus::Processing => Eligibility {
                can_return: false,
                can_cancel: true,
                reason: "Order has not shipped yet".into(),
            },
            OrderStatus::Shipped => Eligibility {
                can_return: false,
                can_cancel: false,
                reason: "Order has already shipped".into(),
            },
            OrderStatus::Cancelled => Eligibility {
                can_return: false,
                can_cancel: false,
                reason: "Order was cancelled".into(),
            },
            OrderStatus::Delivered => {
                let delivered_at = self.delivered_at.unwrap_or(self.created_at);
                let within = now - delivered_at <= Duration::days(RETURN_WINDOW_DAYS);
                Eligibility {
                    can_return: within,
                    can_cancel: false,
                    reason: if within {
                        String::new()
                    } else {
                        format!("Return window of {RETURN_WINDOW_DAYS} days has closed")
                    },
                }
            }
        }
    }

    fn next_status(&self) -> Result<OrderStatus, OrderError> {
        match self.status {
            OrderStatus::Pending => Ok(OrderStatus::Processing),
            OrderStatus::Processing => Ok(OrderStatus::Shipped),
            OrderStatus::Shipped => Ok(OrderStatus::Delivered),
            status @ (OrderStatus::Delivered | OrderStatus::Cancelled) => {
                Err(OrderError::InvalidTransition {
                    status,
                    attempted: "advanced",
                })
            }
        }
    }
}

#[async_trait]
impl ActorEntity for OrderRecord {
    type Id = OrderId;
    type Create = OrderCreate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = ();
    type Error = OrderError;

    /// Totals are always recomputed from the items.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        params.validate()?;
        Ok(Self {
            id,
            totals: projector::compute(&params.items),
            user_id: params.user_id,
            items: params.items,
            address: params.address,
            status: OrderStatus::Pending,
            created_at: params.placed_at,
            delivered_at: None,
        })
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &(),
    ) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Advance { at } => {
                let next = self.next_status()?;
                self.status = next;
                if next == OrderStatus::Delivered {
                    self.delivered_at = Some(at);
                }
                Ok(OrderActionResult::Advanced(next))
            }
            OrderAction::Cancel => {
                if !self.eligibility(Utc::now()).can_cancel {
                    return Err(OrderError::InvalidTransition {
                        status: self.status,
                        attempted: "cancelled",
                    });
                }
                self.status = OrderStatus::Cancelled;
                Ok(OrderActionResult::Cancelled)
            }
            OrderAction::CheckEligibility { now } => {
                Ok(OrderActionResult::Eligibility(self.eligibility(now)))
            }
        }
    }
}
