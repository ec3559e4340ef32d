//! Custom actions for the Order actor.

use crate::model::{Eligibility, OrderStatus};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Move to the next fulfilment stage. Reaching `delivered` stamps `at` as the
    /// delivery time.
    Advance { at: DateTime<Utc> },
    /// Stop the order. Only possible before shipment.
    Cancel,
    /// Whether the order can be returned or cancelled as of `now`.
    CheckEligibility { now: DateTime<Utc> },
}

/// Results from OrderActions; variants match 1:1 with OrderAction.
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Advanced(OrderStatus),
    Cancelled,
    Eligibility(Eligibility),
}
