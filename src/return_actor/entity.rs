//! [`ActorEntity`] implementation for return requests.

use super::actions::ReturnAction;
use super::error::ReturnError;
use crate::clients::{OrderClient, WalletClient};
use crate::framework::{ActorClient, ActorEntity};
use crate::model::{BankDetails, ReturnRequest, ReturnStatus, ReturnType};
use crate::order_actor::OrderId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnId(pub u32);

impl From<u32> for ReturnId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ReturnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "return_{}", self.0)
    }
}

impl FromStr for ReturnId {
    type Err = ReturnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("return_")
            .and_then(|n| n.parse().ok())
            .map(ReturnId)
            .ok_or_else(|| ReturnError::NotFound(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ReturnRecord {
    pub id: ReturnId,
    pub order_id: OrderId,
    pub user_id: String,
    pub return_type: ReturnType,
    pub status: ReturnStatus,
    pub reason: String,
    pub description: Option<String>,
    pub bank_details: Option<BankDetails>,
    /// Set from the order total once the order has been checked.
    pub refund_amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReturnCreate {
    pub user_id: String,
    pub order_id: OrderId,
    pub return_type: ReturnType,
    pub reason: String,
    pub description: Option<String>,
    pub bank_details: Option<BankDetails>,
    pub requested_at: DateTime<Utc>,
}

impl ReturnRecord {
    pub fn to_wire(&self) -> ReturnRequest {
        ReturnRequest {
            id: self.id.to_string(),
            order_id: self.order_id.to_string(),
            status: self.status,
            return_type: self.return_type,
            refund_amount: self.refund_amount,
            reason: self.reason.clone(),
            bank_details: self.bank_details.clone(),
            created_at: Some(self.created_at),
        }
    }

    fn transition(
        &mut self,
        allowed: &[ReturnStatus],
        next: ReturnStatus,
        attempted: &'static str,
    ) -> Result<ReturnStatus, ReturnError> {
        if !allowed.contains(&self.status) {
            return Err(ReturnError::InvalidTransition {
                status: self.status,
                attempted,
            });
        }
        self.status = next;
        Ok(next)
    }
}

#[async_trait]
impl ActorEntity for ReturnRecord {
    type Id = ReturnId;
    type Create = ReturnCreate;
    type Action = ReturnAction;
    type ActionResult = ReturnStatus;
    type Context = (OrderClient, WalletClient);
    type Error = ReturnError;

    fn from_create_params(id: ReturnId, params: ReturnCreate) -> Result<Self, ReturnError> {
        if params.reason.trim().is_empty() {
            return Err(ReturnError::ValidationError("a reason is required".into()));
        }
        if params.return_type == ReturnType::Return && params.bank_details.is_none() {
            return Err(ReturnError::ValidationError(
                "bank details are required for returns".into(),
            ));
        }
        Ok(Self {
            id,
            order_id: params.order_id,
            user_id: params.user_id,
            return_type: params.return_type,
            status: ReturnStatus::Pending,
            reason: params.reason,
            description: params.description,
            bank_details: params.bank_details,
            refund_amount: 0.0,
            created_at: params.requested_at,
        })
    }

    /// Checks the order exists, belongs to the requester and is eligible for this
    /// kind of request, then takes the refund amount from its total.
    async fn on_create(&mut self, ctx: &Self::Context) -> Result<(), ReturnError> {
        let (orders, _) = ctx;
        debug!(order_id = %self.order_id, "Validating order for return request");

        let order = orders
            .get(self.order_id)
            .await?
            .filter(|order| order.user_id == self.user_id)
            .ok_or_else(|| ReturnError::OrderNotFound(self.order_id.to_string()))?;

        let eligibility = orders.eligibility(self.order_id, self.created_at).await?;
        let allowed = match self.return_type {
            ReturnType::Return => eligibility.can_return,
            ReturnType::Cancellation => eligibility.can_cancel,
        };
        if !allowed {
            return Err(ReturnError::NotEligible(eligibility.reason));
        }

        self.refund_amount = order.totals.total;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ReturnAction,
        ctx: &Self::Context,
    ) -> Result<ReturnStatus, ReturnError> {
        let (orders, wallets) = ctx;
        match action {
            ReturnAction::Withdraw => {
                self.transition(&[ReturnStatus::Pending], ReturnStatus::Cancelled, "withdrawn")
            }
            ReturnAction::Approve => {
                if self.status == ReturnStatus::Pending
                    && self.return_type == ReturnType::Cancellation
                {
                    orders.cancel(self.order_id).await?;
                    info!(order_id = %self.order_id, "Order cancelled on approval");
                }
                self.transition(&[ReturnStatus::Pending], ReturnStatus::Approved, "approved")
            }
            ReturnAction::Reject { reason } => {
                let status =
                    self.transition(&[ReturnStatus::Pending], ReturnStatus::Rejected, "rejected")?;
                self.description = Some(reason);
                Ok(status)
            }
            ReturnAction::StartProcessing => self.transition(
                &[ReturnStatus::Approved],
                ReturnStatus::Processing,
                "processed",
            ),
            ReturnAction::Complete { at } => {
                let allowed = [ReturnStatus::Approved, ReturnStatus::Processing];
                if !allowed.contains(&self.status) {
                    return Err(ReturnError::InvalidTransition {
                        status: self.status,
                        attempted: "completed",
                    });
                }
                wallets
                    .credit_user(
                        &self.user_id,
                        self.refund_amount,
                        format!("Refund for {}", self.order_id),
                        at,
                    )
                    .await?;
                self.transition(&allowed, ReturnStatus::Completed, "completed")
            }
        }
    }
}
