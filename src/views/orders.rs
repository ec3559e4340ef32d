//! # Orders Screen
//!
//! Orders grouped into Active / Delivered / Returned tabs, each with its tracking
//! timeline. When the backend cannot be reached the last cached list is shown
//! together with the error and a retry control.

use crate::api::{ApiResult, StorefrontError};
use crate::model::{Order, ReturnRequest};
use crate::projector::{self, ActionGate, DisplayBucket, Totals, TrackingStep};
use crate::session::{CacheKey, SessionContext};
use serde::Serialize;
use tracing::{instrument, warn};

/// One order as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCard {
    pub order: Order,
    pub tracking: [TrackingStep; 5],
    pub bucket: DisplayBucket,
}

impl OrderCard {
    pub fn new(order: Order, returns: &[ReturnRequest]) -> Self {
        Self {
            tracking: projector::project(&order),
            bucket: projector::display_bucket(&order, returns),
            order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrdersSnapshot {
    pub active: Vec<OrderCard>,
    pub delivered: Vec<OrderCard>,
    pub returned: Vec<OrderCard>,
}

impl OrdersSnapshot {
    pub fn build(orders: Vec<Order>, returns: &[ReturnRequest]) -> Self {
        let mut snapshot = Self::default();
        for order in orders {
            let card = OrderCard::new(order, returns);
            match card.bucket {
                DisplayBucket::Active => snapshot.active.push(card),
                DisplayBucket::Delivered => snapshot.delivered.push(card),
                DisplayBucket::Returned => snapshot.returned.push(card),
            }
        }
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.delivered.is_empty() && self.returned.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.delivered.len() + self.returned.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum OrdersView {
    Loaded(OrdersSnapshot),
    /// `cached` is the last list that loaded, or empty.
    Failed {
        message: String,
        retry: bool,
        cached: OrdersSnapshot,
    },
    LoginRequired,
}

/// Fetches orders and return requests and groups them.
///
/// Return requests only refine the Delivered/Returned split, so if they fail
/// the orders are still shown, grouped with the last return requests that loaded.
#[instrument(skip_all, fields(user_id = %ctx.user_id()))]
pub async fn fetch(ctx: &SessionContext) -> ApiResult<OrdersSnapshot> {
    let backend = ctx.backend();
    let (orders, returns) = tokio::join!(
        backend.user_orders(ctx.auth(), ctx.user_id()),
        backend.user_returns(ctx.auth(), ctx.user_id()),
    );
    let orders = orders?;
    let returns = match returns {
        Ok(returns) => {
            ctx.remember(CacheKey::Returns, &grouping_only(&returns)).await;
            returns
        }
        Err(e) => {
            warn!(error = %e, "Return requests unavailable, grouping with cached ones");
            ctx.recall(CacheKey::Returns).await.unwrap_or_default()
        }
    };
    ctx.remember(CacheKey::Orders, &orders).await;
    Ok(OrdersSnapshot::build(orders, &returns))
}

// Bank details stay out of the cache; grouping never reads them.
fn grouping_only(returns: &[ReturnRequest]) -> Vec<ReturnRequest> {
    returns
        .iter()
        .map(|request| ReturnRequest {
            bank_details: None,
            ..request.clone()
        })
        .collect()
}

/// Loads the orders screen. Never fails; errors become part of the view.
///
/// Calling it again is the retry.
pub async fn load(ctx: &SessionContext) -> OrdersView {
    match fetch(ctx).await {
        Ok(snapshot) => OrdersView::Loaded(snapshot),
        Err(StorefrontError::Unauthorized) => OrdersView::LoginRequired,
        Err(e) => {
            let cached: Vec<Order> = ctx.recall(CacheKey::Orders).await.unwrap_or_default();
            let returns: Vec<ReturnRequest> =
                ctx.recall(CacheKey::Returns).await.unwrap_or_default();
            OrdersView::Failed {
                message: e.user_message(),
                retry: e.is_retryable(),
                cached: OrdersSnapshot::build(cached, &returns),
            }
        }
    }
}

/// Tracking page for a single order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub tracking: [TrackingStep; 5],
    /// Recomputed from the items, not taken from the order.
    pub totals: Totals,
    pub actions: ActionGate,
}

/// Loads one order with its eligibility. An eligibility failure leaves every
/// action disabled but still shows the order.
#[instrument(skip(ctx))]
pub async fn track(ctx: &SessionContext, order_id: &str) -> ApiResult<OrderDetail> {
    let backend = ctx.backend();
    let (order, eligibility) = tokio::join!(
        backend.track_order(ctx.auth(), order_id),
        backend.return_eligibility(ctx.auth(), order_id),
    );
    let order = order?;
    if let Err(e) = &eligibility {
        warn!(error = %e, "Eligibility unavailable, actions disabled");
    }
    Ok(OrderDetail {
        tracking: projector::project(&order),
        totals: projector::compute(&order.order_items),
        actions: ActionGate::from_result(&eligibility),
        order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReturnStatus, ReturnType};
    use chrono::Utc;

    fn order(id: &str, status: &str) -> Order {
        Order {
            id: id.into(),
            status: Some(status.into()),
            created_at: Utc::now(),
            order_items: vec![],
            subtotal: 0.0,
            shipping: 50.0,
            total: 50.0,
            address: "4 Elm Row".into(),
        }
    }

    #[test]
    fn test_snapshot_groups_by_bucket() {
        let returns = vec![ReturnRequest {
            id: "return_1".into(),
            order_id: "order_3".into(),
            status: ReturnStatus::Completed,
            return_type: ReturnType::Return,
            refund_amount: 50.0,
            reason: "Too small".into(),
            bank_details: None,
            created_at: None,
        }];
        let snapshot = OrdersSnapshot::build(
            vec![
                order("order_1", "shipped"),
                order("order_2", "delivered"),
                order("order_3", "delivered"),
                order("order_4", "cancelled"),
            ],
            &returns,
        );
        let ids = |cards: &[OrderCard]| cards.iter().map(|c| c.order.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&snapshot.active), vec!["order_1", "order_4"]);
        assert_eq!(ids(&snapshot.delivered), vec!["order_2"]);
        assert_eq!(ids(&snapshot.returned), vec!["order_3"]);
        assert_eq!(snapshot.len(), 4);
    }
}
