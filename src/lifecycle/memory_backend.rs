use crate::api::{ApiResult, AuthToken, StorefrontBackend, StorefrontError};
use crate::clients::{OrderClient, ReturnClient, WalletClient};
use crate::framework::ActorClient;
use crate::model::{
    CancelReturn, Eligibility, NewOrder, NewReturnRequest, Order, OrderStatus, PaymentMethod,
    ReturnRequest, ReturnStatus, WalletDetails, WalletPayment, WalletTransaction,
};
use crate::order_actor::{OrderCreate, OrderId, OrderRecord};
use crate::projector;
use crate::return_actor::{ReturnAction, ReturnCreate, ReturnId, ReturnRecord};
use crate::wallet_actor::{WalletError, WalletOpen};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

// Submitted totals may differ from the recomputed ones by float noise only.
const TOTAL_TOLERANCE: f64 = 0.005;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

/// In-process stand-in for the storefront backend.
///
/// Runs one actor each for orders, return requests and wallets, and implements
/// [`StorefrontBackend`] on top of them, so the storefront core can be exercised
/// end to end without a server. The inherent methods (`register_user`,
/// `advance_order`, `approve_return`, ...) play the part of the store's staff.
///
/// ```ignore
/// let backend = MemoryBackend::start();
/// let token = backend.register_user("user_1", 500.0).await?;
/// let orders = backend.user_orders(&token, "user_1").await?;
/// backend.shutdown().await?;
/// ```
pub struct MemoryBackend {
    pub order_client: OrderClient,
    pub return_client: ReturnClient,
    pub wallet_client: WalletClient,
    /// token -> user id
    sessions: RwLock<HashMap<AuthToken, String>>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl MemoryBackend {
    /// Spawns the actors and wires the return actor to the other two.
    pub fn start() -> Self {
        let (order_actor, order_client) = crate::order_actor::new();
        let (wallet_actor, wallet_client) = crate::wallet_actor::new();
        let (return_actor, return_client) = crate::return_actor::new();

        let order_handle = tokio::spawn(order_actor.run(()));
        let wallet_handle = tokio::spawn(wallet_actor.run(()));
        let return_handle =
            tokio::spawn(return_actor.run((order_client.clone(), wallet_client.clone())));

        Self {
            order_client,
            return_client,
            wallet_client,
            sessions: RwLock::new(HashMap::new()),
            handles: vec![return_handle, order_handle, wallet_handle],
        }
    }

    /// Drops the clients and waits for every actor to stop.
    ///
    /// The return actor holds clones of the order and wallet clients, so those two
    /// stop only after it has.
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down in-process backend...");
        drop(self.return_client);
        drop(self.order_client);
        drop(self.wallet_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(LifecycleError::TaskFailed(e.to_string()));
            }
        }
        info!("In-process backend shutdown complete.");
        Ok(())
    }

    /// Opens a wallet for `user_id` and issues a bearer token for them.
    ///
    /// Each user id can be registered once.
    pub async fn register_user(&self, user_id: &str, opening_balance: f64) -> ApiResult<AuthToken> {
        // held across the check and the open so two registrations cannot interleave
        let mut sessions = self.sessions.write().await;
        match self.wallet_client.for_user(user_id).await {
            Ok(_) => {
                warn!(user_id, "User already registered");
                return Err(StorefrontError::Backend(format!(
                    "User {user_id} is already registered"
                )));
            }
            Err(WalletError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        self.wallet_client
            .open(WalletOpen {
                user_id: user_id.to_string(),
                opening_balance,
                at: Utc::now(),
            })
            .await?;
        let token = AuthToken::new(format!("token-{}-{}", user_id, sessions.len() + 1));
        sessions.insert(token.clone(), user_id.to_string());
        info!(user_id, "User registered");
        Ok(token)
    }

    /// Invalidates a token.
    pub async fn revoke(&self, token: &AuthToken) {
        self.sessions.write().await.remove(token);
    }

    pub async fn advance_order(&self, order_id: &str, at: DateTime<Utc>) -> ApiResult<OrderStatus> {
        let id: OrderId = order_id.parse()?;
        Ok(self.order_client.advance(id, at).await?)
    }

    /// Advances until the order is delivered, stamping `delivered_at`.
    pub async fn deliver_order(&self, order_id: &str, delivered_at: DateTime<Utc>) -> ApiResult<()> {
        while self.advance_order(order_id, delivered_at).await? != OrderStatus::Delivered {}
        Ok(())
    }

    pub async fn approve_return(&self, return_id: &str) -> ApiResult<ReturnStatus> {
        self.review(return_id, ReturnAction::Approve).await
    }

    pub async fn reject_return(&self, return_id: &str, reason: &str) -> ApiResult<ReturnStatus> {
        self.review(
            return_id,
            ReturnAction::Reject {
                reason: reason.to_string(),
            },
        )
        .await
    }

    pub async fn start_processing_return(&self, return_id: &str) -> ApiResult<ReturnStatus> {
        self.review(return_id, ReturnAction::StartProcessing).await
    }

    /// Completes the request and credits the refund to the customer's wallet.
    pub async fn complete_return(&self, return_id: &str) -> ApiResult<ReturnStatus> {
        self.review(return_id, ReturnAction::Complete { at: Utc::now() })
            .await
    }

    async fn review(&self, return_id: &str, action: ReturnAction) -> ApiResult<ReturnStatus> {
        let id: ReturnId = return_id.parse()?;
        Ok(self.return_client.apply(id, action).await?)
    }

    async fn authorize(&self, auth: &AuthToken) -> ApiResult<String> {
        self.sessions
            .read()
            .await
            .get(auth)
            .cloned()
            .ok_or(StorefrontError::Unauthorized)
    }

    // The token must belong to the user named in the path.
    async fn authorize_user(&self, auth: &AuthToken, user_id: &str) -> ApiResult<()> {
        if self.authorize(auth).await? == user_id {
            Ok(())
        } else {
            warn!(user_id, "Token does not belong to requested user");
            Err(StorefrontError::Unauthorized)
        }
    }

    async fn owned_order(&self, user_id: &str, order_id: &str) -> ApiResult<OrderRecord> {
        let not_found = || StorefrontError::Backend("Order not found".into());
        let id: OrderId = order_id.parse().map_err(|_| not_found())?;
        self.order_client
            .get(id)
            .await?
            .filter(|order| order.user_id == user_id)
            .ok_or_else(not_found)
    }

    async fn owned_return(&self, user_id: &str, return_id: &str) -> ApiResult<ReturnRecord> {
        let not_found = || StorefrontError::Backend("Return request not found".into());
        let id: ReturnId = return_id.parse().map_err(|_| not_found())?;
        self.return_client
            .get(id)
            .await?
            .filter(|request| request.user_id == user_id)
            .ok_or_else(not_found)
    }

    // Gives back a wallet debit whose order could not be created.
    async fn refund_payment(&self, user_id: &str, amount: f64) {
        let credited = self
            .wallet_client
            .credit_user(user_id, amount, "Order payment reversed".into(), Utc::now())
            .await;
        if let Err(e) = credited {
            error!(user_id, amount, error = %e, "Could not reverse wallet payment");
        }
    }

    // Stand-in for gateway signature verification: every field must be present.
    fn verify_payment(payment: &PaymentMethod) -> ApiResult<()> {
        if let PaymentMethod::Razorpay(confirmation) = payment {
            let fields = [
                &confirmation.razorpay_order_id,
                &confirmation.razorpay_payment_id,
                &confirmation.razorpay_signature,
            ];
            if fields.iter().any(|field| field.trim().is_empty()) {
                return Err(StorefrontError::Backend("Payment verification failed".into()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StorefrontBackend for MemoryBackend {
    #[instrument(skip(self, auth))]
    async fn user_orders(&self, auth: &AuthToken, user_id: &str) -> ApiResult<Vec<Order>> {
        self.authorize_user(auth, user_id).await?;
        let orders = self.order_client.for_user(user_id).await?;
        Ok(orders.iter().map(OrderRecord::to_wire).collect())
    }

    #[instrument(skip(self, auth))]
    async fn track_order(&self, auth: &AuthToken, order_id: &str) -> ApiResult<Order> {
        let user_id = self.authorize(auth).await?;
        Ok(self.owned_order(&user_id, order_id).await?.to_wire())
    }

    #[instrument(skip(self, auth))]
    async fn return_eligibility(
        &self,
        auth: &AuthToken,
        order_id: &str,
    ) -> ApiResult<Eligibility> {
        let user_id = self.authorize(auth).await?;
        let order = self.owned_order(&user_id, order_id).await?;
        Ok(self.order_client.eligibility(order.id, Utc::now()).await?)
    }

    #[instrument(skip(self, auth, request), fields(order_id = %request.order_id))]
    async fn create_return(
        &self,
        auth: &AuthToken,
        request: &NewReturnRequest,
    ) -> ApiResult<ReturnRequest> {
        let user_id = self.authorize(auth).await?;
        let order = self.owned_order(&user_id, &request.order_id).await?;
        if !self.return_client.open_for_order(order.id).await?.is_empty() {
            return Err(StorefrontError::Backend(format!(
                "A request is already open for {}",
                order.id
            )));
        }

        let id = self
            .return_client
            .create_return(ReturnCreate {
                user_id,
                order_id: order.id,
                return_type: request.return_type,
                reason: request.reason.clone(),
                description: request.description.clone(),
                bank_details: request.bank_details.clone(),
                requested_at: Utc::now(),
            })
            .await?;
        let created = self
            .return_client
            .get(id)
            .await?
            .ok_or_else(|| StorefrontError::Backend("Return request not found".into()))?;
        Ok(created.to_wire())
    }

    #[instrument(skip(self, auth))]
    async fn cancel_return(&self, auth: &AuthToken, request: &CancelReturn) -> ApiResult<()> {
        let user_id = self.authorize(auth).await?;
        let record = self
            .owned_return(&user_id, &request.return_request_id)
            .await?;
        self.return_client
            .apply(record.id, ReturnAction::Withdraw)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, auth))]
    async fn user_returns(
        &self,
        auth: &AuthToken,
        user_id: &str,
    ) -> ApiResult<Vec<ReturnRequest>> {
        self.authorize_user(auth, user_id).await?;
        let requests = self.return_client.for_user(user_id).await?;
        Ok(requests.iter().map(ReturnRecord::to_wire).collect())
    }

    /// Recomputes totals from the items and refuses a mismatching submission.
    /// Wallet payments are debited before the order is created.
    #[instrument(skip(self, auth, order), fields(total = order.total))]
    async fn create_order(&self, auth: &AuthToken, order: &NewOrder) -> ApiResult<Order> {
        self.authorize_user(auth, &order.user_id).await?;
        Self::verify_payment(&order.payment)?;

        let expected = projector::compute(&order.order_items);
        let submitted = [order.subtotal, order.shipping, order.total];
        let computed = [expected.subtotal, expected.shipping, expected.total];
        if submitted
            .iter()
            .zip(computed.iter())
            .any(|(a, b)| (a - b).abs() > TOTAL_TOLERANCE)
        {
            warn!(?expected, "Submitted totals do not match items");
            return Err(StorefrontError::Backend("Order total mismatch".into()));
        }

        let params = OrderCreate {
            user_id: order.user_id.clone(),
            items: order.order_items.clone(),
            address: order.address.clone(),
            placed_at: Utc::now(),
        };
        // nothing is charged for an order that would be refused
        params.validate()?;

        let paid_from_wallet = order.payment == PaymentMethod::Wallet;
        if paid_from_wallet {
            self.wallet_client
                .debit_user(
                    &order.user_id,
                    expected.total,
                    "Order payment".into(),
                    Utc::now(),
                )
                .await?;
        }

        let id = match self.order_client.create_order(params).await {
            Ok(id) => id,
            Err(e) => {
                if paid_from_wallet {
                    self.refund_payment(&order.user_id, expected.total).await;
                }
                return Err(e.into());
            }
        };
        let created = self
            .order_client
            .get(id)
            .await?
            .ok_or_else(|| StorefrontError::Backend("Order not found".into()))?;
        info!(order_id = %id, "Order placed");
        Ok(created.to_wire())
    }

    #[instrument(skip(self, auth))]
    async fn wallet_details(&self, auth: &AuthToken) -> ApiResult<WalletDetails> {
        let user_id = self.authorize(auth).await?;
        Ok(self.wallet_client.for_user(&user_id).await?.details())
    }

    #[instrument(skip(self, auth))]
    async fn wallet_transactions(&self, auth: &AuthToken) -> ApiResult<Vec<WalletTransaction>> {
        let user_id = self.authorize(auth).await?;
        Ok(self.wallet_client.for_user(&user_id).await?.statement())
    }

    #[instrument(skip(self, auth))]
    async fn wallet_pay(
        &self,
        auth: &AuthToken,
        payment: &WalletPayment,
    ) -> ApiResult<WalletDetails> {
        let user_id = self.authorize(auth).await?;
        let description = match &payment.order_id {
            Some(order_id) => format!("Payment for {order_id}"),
            None => "Wallet payment".to_string(),
        };
        let balance = self
            .wallet_client
            .debit_user(&user_id, payment.amount, description, Utc::now())
            .await?;
        Ok(WalletDetails { balance })
    }
}
