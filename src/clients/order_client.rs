//! # Order Client
//!
//! Typed API over the Order actor.
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Eligibility, OrderStatus};
use crate::order_actor::{OrderAction, OrderActionResult, OrderCreate, OrderError, OrderId, OrderRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<OrderRecord>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<OrderRecord>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params), fields(user_id = %params.user_id))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<OrderId, OrderError> {
        debug!(?params, "create_order called");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Orders placed by `user_id`, oldest first.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<OrderRecord>, OrderError> {
        let user_id = user_id.to_string();
        self.find(move |order: &OrderRecord| order.user_id == user_id)
            .await
    }

    #[instrument(skip(self))]
    pub async fn advance(&self, id: OrderId, at: DateTime<Utc>) -> Result<OrderStatus, OrderError> {
        match self.inner.perform_action(id, OrderAction::Advance { at }).await {
            Ok(OrderActionResult::Advanced(status)) => Ok(status),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: OrderId) -> Result<(), OrderError> {
        match self.inner.perform_action(id, OrderAction::Cancel).await {
            Ok(OrderActionResult::Cancelled) => Ok(()),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    #[instrument(skip(self))]
    pub async fn eligibility(
        &self,
        id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<Eligibility, OrderError> {
        match self
            .inner
            .perform_action(id, OrderAction::CheckEligibility { now })
            .await
        {
            Ok(OrderActionResult::Eligibility(eligibility)) => Ok(eligibility),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}

fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::ActorCommunicationError(format!("unexpected action result {result:?}"))
}

#[async_trait]
impl ActorClient<OrderRecord> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<OrderRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action};

    #[tokio::test]
    async fn test_eligibility_unwraps_result() {
        let (client, mut receiver) = create_mock_client::<OrderRecord>(10);
        let order_client = OrderClient::new(client);

        let task = tokio::spawn(async move { order_client.eligibility(OrderId(3), Utc::now()).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, OrderId(3));
        assert!(matches!(action, OrderAction::CheckEligibility { .. }));

        responder
            .send(Ok(OrderActionResult::Eligibility(Eligibility {
                can_return: false,
                can_cancel: true,
                reason: String::new(),
            })))
            .unwrap();

        let eligibility = task.await.unwrap().unwrap();
        assert!(eligibility.can_cancel);
    }

    #[tokio::test]
    async fn test_entity_error_is_recovered() {
        let (client, mut receiver) = create_mock_client::<OrderRecord>(10);
        let order_client = OrderClient::new(client);

        let task = tokio::spawn(async move { order_client.cancel(OrderId(1)).await });

        let (_, _, responder) = expect_action(&mut receiver).await.unwrap();
        let rejection = OrderError::InvalidTransition {
            status: OrderStatus::Shipped,
            attempted: "cancelled",
        };
        responder
            .send(Err(FrameworkError::EntityError(Box::new(rejection.clone()))))
            .unwrap();

        assert_eq!(task.await.unwrap(), Err(rejection));
    }

    #[tokio::test]
    async fn test_closed_actor_is_communication_error() {
        let (client, receiver) = create_mock_client::<OrderRecord>(1);
        drop(receiver);
        let result = OrderClient::new(client).cancel(OrderId(1)).await;
        assert!(matches!(result, Err(OrderError::ActorCommunicationError(_))));
    }
}
