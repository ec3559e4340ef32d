//! # Return Client
//!
//! Typed API over the Return actor. Order validation happens in the actor's
//! `on_create` hook, not here.
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::ReturnStatus;
use crate::order_actor::OrderId;
use crate::return_actor::{ReturnAction, ReturnCreate, ReturnError, ReturnId, ReturnRecord};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct ReturnClient {
    inner: ResourceClient<ReturnRecord>,
}

impl ReturnClient {
    pub fn new(inner: ResourceClient<ReturnRecord>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(order_id = %params.order_id))]
    pub async fn create_return(&self, params: ReturnCreate) -> Result<ReturnId, ReturnError> {
        debug!(
            user_id = %params.user_id,
            return_type = ?params.return_type,
            with_bank_details = params.bank_details.is_some(),
            "create_return called"
        );
        info!("Sending create_return to actor");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Vec<ReturnRecord>, ReturnError> {
        let user_id = user_id.to_string();
        self.find(move |request: &ReturnRecord| request.user_id == user_id)
            .await
    }

    /// Pending, approved or processing requests for an order.
    pub async fn open_for_order(&self, order_id: OrderId) -> Result<Vec<ReturnRecord>, ReturnError> {
        self.find(move |request: &ReturnRecord| {
            request.order_id == order_id && request.status.is_open()
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn apply(&self, id: ReturnId, action: ReturnAction) -> Result<ReturnStatus, ReturnError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<ReturnRecord> for ReturnClient {
    type Error = ReturnError;

    fn inner(&self) -> &ResourceClient<ReturnRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}
