use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /wallet/details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletDetails {
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// One entry of `GET /wallet/transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Amount with its sign: credits positive, debits negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Credit => self.amount,
            TransactionKind::Debit => -self.amount,
        }
    }
}

/// Body of `POST /wallet/pay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletPayment {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}
