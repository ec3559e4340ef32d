use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum WalletAction {
    Credit {
        amount: f64,
        description: String,
        at: DateTime<Utc>,
    },
    /// Fails without touching the balance if it would go negative.
    Debit {
        amount: f64,
        description: String,
        at: DateTime<Utc>,
    },
}

/// Balance after the action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalletBalance(pub f64);
