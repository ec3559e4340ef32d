//! # Wallet Screen
//!
//! Balance and history, fetched together. The reported balance is checked
//! against the history; a mismatch is shown rather than silently corrected.

use crate::api::ApiResult;
use crate::model::{WalletDetails, WalletPayment, WalletTransaction};
use crate::session::SessionContext;
use serde::Serialize;
use tracing::{info, instrument, warn};

// Half a paisa.
const RECONCILE_TOLERANCE: f64 = 0.005;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletView {
    pub balance: f64,
    /// Newest first, as the backend sends them.
    pub transactions: Vec<WalletTransaction>,
    /// Σ credits − Σ debits.
    pub computed_balance: f64,
    /// `balance - computed_balance`, when they disagree.
    pub discrepancy: Option<f64>,
}

impl WalletView {
    pub fn reconcile(details: WalletDetails, transactions: Vec<WalletTransaction>) -> Self {
        let computed_balance: f64 = transactions
            .iter()
            .map(WalletTransaction::signed_amount)
            .sum();
        let difference = details.balance - computed_balance;
        let discrepancy = (difference.abs() > RECONCILE_TOLERANCE).then_some(difference);
        if let Some(difference) = discrepancy {
            warn!(
                balance = details.balance,
                computed_balance, difference, "Wallet balance does not match history"
            );
        }
        Self {
            balance: details.balance,
            transactions,
            computed_balance,
            discrepancy,
        }
    }
}

#[instrument(skip_all, fields(user_id = %ctx.user_id()))]
pub async fn load(ctx: &SessionContext) -> ApiResult<WalletView> {
    let backend = ctx.backend();
    let (details, transactions) = tokio::try_join!(
        backend.wallet_details(ctx.auth()),
        backend.wallet_transactions(ctx.auth()),
    )?;
    Ok(WalletView::reconcile(details, transactions))
}

/// Pays from the wallet. Returns the new balance.
#[instrument(skip(ctx))]
pub async fn pay(ctx: &SessionContext, amount: f64, order_id: Option<String>) -> ApiResult<f64> {
    let payment = WalletPayment { amount, order_id };
    let details = ctx.backend().wallet_pay(ctx.auth(), &payment).await?;
    info!(balance = details.balance, "Wallet payment accepted");
    Ok(details.balance)
}
