use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Backend-owned lifecycle of a return or cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    Pending,
    Approved,
    Processing,
    Completed,
    Rejected,
    Cancelled,
}

impl ReturnStatus {
    /// Rejected, cancelled and completed requests no longer block a new request.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            ReturnStatus::Pending | ReturnStatus::Approved | ReturnStatus::Processing
        )
    }
}

impl Display for ReturnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReturnStatus::Pending => "pending",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Processing => "processing",
            ReturnStatus::Completed => "completed",
            ReturnStatus::Rejected => "rejected",
            ReturnStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    /// Send a delivered order back.
    Return,
    /// Stop an order before it ships.
    Cancellation,
}

/// Where a refund is paid to.
///
/// `Debug` masks the account number and IFSC code, so requests carrying these
/// details can be logged as they are.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
}

impl fmt::Debug for BankDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.account_number.chars().count();
        let last_four: String = self.account_number.chars().skip(digits.saturating_sub(4)).collect();
        let masked = if digits > 4 {
            format!("****{last_four}")
        } else {
            "****".to_string()
        };
        f.debug_struct("BankDetails")
            .field("account_holder_name", &self.account_holder_name)
            .field("account_number", &masked)
            .field("ifsc_code", &"****")
            .field("bank_name", &self.bank_name)
            .finish()
    }
}

/// A return request as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: String,
    pub order_id: String,
    pub status: ReturnStatus,
    pub return_type: ReturnType,
    #[serde(default)]
    pub refund_amount: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub bank_details: Option<BankDetails>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /return-orders/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReturnRequest {
    pub order_id: String,
    pub return_type: ReturnType,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,
}

/// Body of `PUT /return-orders/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelReturn {
    pub return_request_id: String,
}

/// Answer of `GET /return-orders/eligibility/:orderId`. Authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(default)]
    pub can_return: bool,
    #[serde(default)]
    pub can_cancel: bool,
    #[serde(default)]
    pub reason: String,
}
