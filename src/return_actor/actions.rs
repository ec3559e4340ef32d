//! Review workflow for return requests.
//!
//! ```text
//! pending ──approve──> approved ──start──> processing ──complete──> completed
//!    │                    └──────────────complete─────────────────────┘
//!    ├──reject──> rejected
//!    └──withdraw──> cancelled
//! ```

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum ReturnAction {
    /// Customer withdraws a pending request.
    Withdraw,
    /// For cancellations this also cancels the order.
    Approve,
    Reject { reason: String },
    StartProcessing,
    /// Credits the refund to the customer's wallet.
    Complete { at: DateTime<Utc> },
}
