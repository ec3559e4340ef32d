use super::actions::{WalletAction, WalletBalance};
use super::error::WalletError;
use crate::framework::ActorEntity;
use crate::model::{TransactionKind, WalletDetails, WalletTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletId(pub u32);

impl From<u32> for WalletId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for WalletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wallet_{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub id: WalletId,
    pub user_id: String,
    pub balance: f64,
    /// Oldest first.
    pub transactions: Vec<WalletTransaction>,
}

#[derive(Debug, Clone)]
pub struct WalletOpen {
    pub user_id: String,
    pub opening_balance: f64,
    pub at: DateTime<Utc>,
}

impl WalletRecord {
    pub fn details(&self) -> WalletDetails {
        WalletDetails {
            balance: self.balance,
        }
    }

    /// History as the storefront lists it, newest first.
    pub fn statement(&self) -> Vec<WalletTransaction> {
        self.transactions.iter().rev().cloned().collect()
    }

    fn record(&mut self, kind: TransactionKind, amount: f64, description: String, at: DateTime<Utc>) {
        let id = format!("{}_txn_{}", self.id, self.transactions.len() + 1);
        self.transactions.push(WalletTransaction {
            id,
            kind,
            amount,
            description,
            created_at: at,
        });
    }
}

fn checked_amount(amount: f64) -> Result<f64, WalletError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(WalletError::InvalidAmount(amount))
    }
}

#[async_trait]
impl ActorEntity for WalletRecord {
    type Id = WalletId;
    type Create = WalletOpen;
    type Action = WalletAction;
    type ActionResult = WalletBalance;
    type Context = ();
    type Error = WalletError;

    /// A non-zero opening balance is recorded as the first credit so the history
    /// always sums to the balance.
    fn from_create_params(id: WalletId, params: WalletOpen) -> Result<Self, WalletError> {
        let mut wallet = Self {
            id,
            user_id: params.user_id,
            balance: 0.0,
            transactions: Vec::new(),
        };
        if params.opening_balance != 0.0 {
            let amount = checked_amount(params.opening_balance)?;
            wallet.balance = amount;
            wallet.record(TransactionKind::Credit, amount, "Opening balance".into(), params.at);
        }
        Ok(wallet)
    }

    async fn handle_action(
        &mut self,
        action: WalletAction,
        _ctx: &(),
    ) -> Result<WalletBalance, WalletError> {
        match action {
            WalletAction::Credit {
                amount,
                description,
                at,
            } => {
                let amount = checked_amount(amount)?;
                self.balance += amount;
                self.record(TransactionKind::Credit, amount, description, at);
            }
            WalletAction::Debit {
                amount,
                description,
                at,
            } => {
                let amount = checked_amount(amount)?;
                if amount > self.balance {
                    return Err(WalletError::InsufficientFunds {
                        requested: amount,
                        available: self.balance,
                    });
                }
                self.balance -= amount;
                self.record(TransactionKind::Debit, amount, description, at);
            }
        }
        Ok(WalletBalance(self.balance))
    }
}
