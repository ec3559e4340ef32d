//! # Storefront Backend Boundary
//!
//! [`StorefrontBackend`] is the one seam between the storefront core and whatever
//! answers its requests: the hosted REST API ([`HttpBackend`](crate::api::HttpBackend))
//! or the in-process actors ([`MemoryBackend`](crate::lifecycle::MemoryBackend)).
//! Every operation takes the caller's [`AuthToken`] and returns a typed
//! [`ApiResult`], so callers always handle both outcomes.

use crate::api::error::ApiResult;
use crate::model::{
    CancelReturn, Eligibility, NewOrder, NewReturnRequest, Order, ReturnRequest, WalletDetails,
    WalletPayment, WalletTransaction,
};
use async_trait::async_trait;
use std::fmt;

/// Bearer token issued at login.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Tokens must not end up in logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// `GET /order/user/:id`
    async fn user_orders(&self, auth: &AuthToken, user_id: &str) -> ApiResult<Vec<Order>>;

    /// `GET /order/track/:id`
    async fn track_order(&self, auth: &AuthToken, order_id: &str) -> ApiResult<Order>;

    /// `GET /return-orders/eligibility/:orderId`
    async fn return_eligibility(&self, auth: &AuthToken, order_id: &str)
        -> ApiResult<Eligibility>;

    /// `POST /return-orders/create`
    async fn create_return(
        &self,
        auth: &AuthToken,
        request: &NewReturnRequest,
    ) -> ApiResult<ReturnRequest>;

    /// `PUT /return-orders/cancel`
    async fn cancel_return(&self, auth: &AuthToken, request: &CancelReturn) -> ApiResult<()>;

    /// `GET /return-orders/user/:id`
    async fn user_returns(&self, auth: &AuthToken, user_id: &str)
        -> ApiResult<Vec<ReturnRequest>>;

    /// `POST /order/create`. For gateway payments the backend verifies the
    /// confirmation signature before accepting.
    async fn create_order(&self, auth: &AuthToken, order: &NewOrder) -> ApiResult<Order>;

    /// `GET /wallet/details`
    async fn wallet_details(&self, auth: &AuthToken) -> ApiResult<WalletDetails>;

    /// `GET /wallet/transactions`, newest first.
    async fn wallet_transactions(&self, auth: &AuthToken) -> ApiResult<Vec<WalletTransaction>>;

    /// `POST /wallet/pay`. Returns the balance after the debit.
    async fn wallet_pay(&self, auth: &AuthToken, payment: &WalletPayment)
        -> ApiResult<WalletDetails>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted_in_debug() {
        let token = AuthToken::new("secret-token");
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
        assert_eq!(token.expose(), "secret-token");
    }
}
