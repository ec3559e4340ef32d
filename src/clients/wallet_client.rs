//! # Wallet Client
//!
//! Wallets are addressed by user id from outside; the client resolves the
//! wallet record first.
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::wallet_actor::{WalletAction, WalletBalance, WalletError, WalletId, WalletOpen, WalletRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct WalletClient {
    inner: ResourceClient<WalletRecord>,
}

impl WalletClient {
    pub fn new(inner: ResourceClient<WalletRecord>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(user_id = %params.user_id))]
    pub async fn open(&self, params: WalletOpen) -> Result<WalletId, WalletError> {
        debug!(opening_balance = params.opening_balance, "open called");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    pub async fn for_user(&self, user_id: &str) -> Result<WalletRecord, WalletError> {
        let owner = user_id.to_string();
        self.find(move |wallet: &WalletRecord| wallet.user_id == owner)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::NotFound(user_id.to_string()))
    }

    #[instrument(skip(self, description))]
    pub async fn credit_user(
        &self,
        user_id: &str,
        amount: f64,
        description: String,
        at: DateTime<Utc>,
    ) -> Result<f64, WalletError> {
        let wallet = self.for_user(user_id).await?;
        self.act(
            wallet.id,
            WalletAction::Credit {
                amount,
                description,
                at,
            },
        )
        .await
    }

    #[instrument(skip(self, description))]
    pub async fn debit_user(
        &self,
        user_id: &str,
        amount: f64,
        description: String,
        at: DateTime<Utc>,
    ) -> Result<f64, WalletError> {
        let wallet = self.for_user(user_id).await?;
        self.act(
            wallet.id,
            WalletAction::Debit {
                amount,
                description,
                at,
            },
        )
        .await
    }

    async fn act(&self, id: WalletId, action: WalletAction) -> Result<f64, WalletError> {
        self.inner
            .perform_action(id, action)
            .await
            .map(|WalletBalance(balance)| balance)
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<WalletRecord> for WalletClient {
    type Error = WalletError;

    fn inner(&self) -> &ResourceClient<WalletRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;

    fn wallet(user_id: &str) -> WalletRecord {
        WalletRecord {
            id: WalletId(4),
            user_id: user_id.into(),
            balance: 20.0,
            transactions: vec![],
        }
    }

    #[tokio::test]
    async fn test_debit_resolves_wallet_by_user() {
        let mut mock = MockClient::<WalletRecord>::new();
        mock.expect_list().return_ok(vec![wallet("user_1")]);
        mock.expect_action(WalletId(4)).return_ok(WalletBalance(5.0));

        let client = WalletClient::new(mock.client());
        let balance = client
            .debit_user("user_1", 15.0, "Order payment".into(), Utc::now())
            .await
            .unwrap();

        assert_eq!(balance, 5.0);
        mock.verify();
    }

    #[tokio::test]
    async fn test_missing_wallet_is_not_found() {
        let mut mock = MockClient::<WalletRecord>::new();
        mock.expect_list().return_ok(vec![]);

        let client = WalletClient::new(mock.client());
        let result = client.for_user("ghost").await;

        assert_eq!(result.unwrap_err(), WalletError::NotFound("ghost".into()));
        mock.verify();
    }
}
