//! # Return Requests Screen
//!
//! Lists the user's requests, offers new ones for eligible orders, and validates
//! the request form before anything is sent.

use crate::api::{ApiResult, StorefrontError};
use crate::model::{
    BankDetails, CancelReturn, NewReturnRequest, Order, ReturnRequest, ReturnStatus, ReturnType,
};
use crate::projector::{self, ActionGate, OrderAction};
use crate::session::SessionContext;
use serde::Serialize;
use tracing::{info, instrument};

/// A request as listed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnRow {
    pub request: ReturnRequest,
    /// Only once the refund has actually been paid.
    pub refund_shown: Option<f64>,
    /// "Cancel Request" is offered only while the request is pending.
    pub can_cancel_request: bool,
}

impl From<ReturnRequest> for ReturnRow {
    fn from(request: ReturnRequest) -> Self {
        Self {
            refund_shown: (request.status == ReturnStatus::Completed)
                .then_some(request.refund_amount),
            can_cancel_request: request.status == ReturnStatus::Pending,
            request,
        }
    }
}

#[instrument(skip_all, fields(user_id = %ctx.user_id()))]
pub async fn load(ctx: &SessionContext) -> ApiResult<Vec<ReturnRow>> {
    let requests = ctx
        .backend()
        .user_returns(ctx.auth(), ctx.user_id())
        .await?;
    Ok(requests.into_iter().map(ReturnRow::from).collect())
}

/// Withdraws a pending request.
#[instrument(skip_all, fields(return_id = %row.request.id))]
pub async fn cancel_request(ctx: &SessionContext, row: &ReturnRow) -> ApiResult<()> {
    if !row.can_cancel_request {
        return Err(StorefrontError::validation(
            "status",
            format!("A {} request can no longer be cancelled", row.request.status),
        ));
    }
    let request = CancelReturn {
        return_request_id: row.request.id.clone(),
    };
    ctx.backend().cancel_return(ctx.auth(), &request).await?;
    info!("Return request withdrawn");
    Ok(())
}

/// An order the user could file a request for, with what the backend allows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnCandidate {
    pub order: Order,
    pub kind: ReturnType,
    pub policy: &'static str,
    pub actions: ActionGate,
}

/// Delivered orders (return) and unshipped orders (cancellation) with their
/// eligibility. A failed eligibility call disables that order only.
#[instrument(skip_all, fields(user_id = %ctx.user_id()))]
pub async fn candidates(ctx: &SessionContext) -> ApiResult<Vec<ReturnCandidate>> {
    let orders = ctx
        .backend()
        .user_orders(ctx.auth(), ctx.user_id())
        .await?;
    let mut candidates = Vec::new();
    for order in orders {
        let Some(kind) = projector::candidate_kind(order.status()) else {
            continue;
        };
        let eligibility = ctx
            .backend()
            .return_eligibility(ctx.auth(), &order.id)
            .await;
        candidates.push(ReturnCandidate {
            order,
            kind,
            policy: projector::policy_copy(kind),
            actions: ActionGate::from_result(&eligibility),
        });
    }
    Ok(candidates)
}

/// The return request form as filled in by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnForm {
    pub order_id: String,
    pub reason: String,
    pub description: String,
    pub bank: BankDetails,
}

const IFSC_LEN: usize = 11;

impl ReturnForm {
    /// Checks the form for a request of `kind`. Bank details are only needed
    /// when money goes back to the customer for a delivered order.
    pub fn validate(&self, kind: ReturnType) -> ApiResult<NewReturnRequest> {
        if self.reason.trim().is_empty() {
            return Err(StorefrontError::validation("reason", "Please select a reason"));
        }
        let bank_details = match kind {
            ReturnType::Return => Some(self.validated_bank()?),
            ReturnType::Cancellation => None,
        };
        let description = self.description.trim();
        Ok(NewReturnRequest {
            order_id: self.order_id.clone(),
            return_type: kind,
            reason: self.reason.trim().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            bank_details,
        })
    }

    fn validated_bank(&self) -> ApiResult<BankDetails> {
        let bank = &self.bank;
        let holder = bank.account_holder_name.trim();
        if holder.is_empty() {
            return Err(StorefrontError::validation(
                "account_holder_name",
                "Account holder name is required",
            ));
        }
        let account = bank.account_number.trim();
        if account.is_empty() {
            return Err(StorefrontError::validation(
                "account_number",
                "Account number is required",
            ));
        }
        if !account.chars().all(|c| c.is_ascii_digit()) {
            return Err(StorefrontError::validation(
                "account_number",
                "Account number must contain digits only",
            ));
        }
        let ifsc = bank.ifsc_code.trim().to_ascii_uppercase();
        if ifsc.is_empty() {
            return Err(StorefrontError::validation("ifsc_code", "IFSC code is required"));
        }
        if !is_ifsc(&ifsc) {
            return Err(StorefrontError::validation(
                "ifsc_code",
                "IFSC code must look like ABCD0123456",
            ));
        }
        Ok(BankDetails {
            account_holder_name: holder.to_string(),
            account_number: account.to_string(),
            ifsc_code: ifsc,
            bank_name: bank
                .bank_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        })
    }
}

// Four letters, a zero, then six letters or digits.
fn is_ifsc(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == IFSC_LEN
        && bytes[..4].iter().all(u8::is_ascii_alphabetic)
        && bytes[4] == b'0'
        && bytes[5..].iter().all(u8::is_ascii_alphanumeric)
}

/// Validates and submits a request. Refused locally if the backend did not
/// allow this kind of request for the order.
#[instrument(skip_all, fields(order_id = %form.order_id, ?kind))]
pub async fn submit(
    ctx: &SessionContext,
    form: &ReturnForm,
    kind: ReturnType,
    actions: &ActionGate,
) -> ApiResult<ReturnRequest> {
    if !actions.allows(OrderAction::for_kind(kind)) {
        return Err(StorefrontError::validation(
            "return_type",
            actions
                .note
                .clone()
                .unwrap_or_else(|| "This order is not eligible".to_string()),
        ));
    }
    let request = form.validate(kind)?;
    let created = ctx.backend().create_return(ctx.auth(), &request).await?;
    info!(return_id = %created.id, "Return request submitted");
    Ok(created)
}
