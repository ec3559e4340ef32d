//! # Mock Clients
//!
//! A [`MockClient<T>`] hands out a real [`ResourceClient<T>`] whose requests are
//! answered from a queue of expectations instead of by a running actor. Use it to
//! test an actor whose hooks call other actors (the return-request actor checks
//! the order actor on create) without spawning those dependencies.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | **State** | none, canned answers | real store |
//! | **Error injection** | `return_err` | needs a specific state |
//! | **Use case** | logic around a client | the actor itself, full system |
//!
//! For lower-level assertions on the exact request payload, use
//! [`create_mock_client`] with [`expect_create`], [`expect_get`] or
//! [`expect_action`] and answer through the returned responder.

use crate::framework::client::ResourceClient;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::ResourceRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

enum Expectation<T: ActorEntity> {
    Get(Result<Option<T>, FrameworkError>),
    Create(Result<T::Id, FrameworkError>),
    List(Result<Vec<T>, FrameworkError>),
    Action(Result<T::ActionResult, FrameworkError>),
}

impl<T: ActorEntity> Expectation<T> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::Get(_) => "Get",
            Expectation::Create(_) => "Create",
            Expectation::List(_) => "List",
            Expectation::Action(_) => "Action",
        }
    }
}

struct MockState<T: ActorEntity> {
    queue: VecDeque<(Option<T::Id>, Expectation<T>)>,
    mismatches: Vec<String>,
}

type Shared<T> = Arc<Mutex<MockState<T>>>;

/// A client backed by an expectation queue.
///
/// ```ignore
/// let mut orders = MockClient::<OrderRecord>::new();
/// orders.expect_get(OrderId(1)).return_ok(Some(record));
/// let client = OrderClient::new(orders.client());
/// // ... exercise code that calls client.get(...)
/// orders.verify();
/// ```
///
/// Requests are answered strictly in the order expectations were queued. A request
/// that does not match the next expectation (wrong kind or wrong id) gets its
/// responder dropped, so the caller sees [`FrameworkError::ActorDropped`], and the
/// mismatch is reported by [`MockClient::verify`].
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    state: Shared<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let state: Shared<T> = Arc::new(Mutex::new(MockState {
            queue: VecDeque::new(),
            mismatches: Vec::new(),
        }));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut state = task_state.lock().expect("mock state poisoned");
                let next = state.queue.pop_front();
                if let Err(mismatch) = answer(request, next) {
                    state.mismatches.push(mismatch);
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// A client whose requests are answered by this mock.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(Some(id), Expectation::Get)
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(None, Expectation::Create)
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(None, Expectation::List)
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(Some(id), Expectation::Action)
    }

    fn builder<R>(
        &mut self,
        id: Option<T::Id>,
        wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            id,
            wrap,
            state: self.state.clone(),
        }
    }

    /// Panics if an expectation was left unused or a request did not match.
    pub fn verify(&self) {
        let state = self.state.lock().expect("mock state poisoned");
        if !state.mismatches.is_empty() {
            panic!("Unexpected requests: {:?}", state.mismatches);
        }
        if !state.queue.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.queue.len()
            );
        }
    }
}

/// Completes an expectation with its canned response.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    id: Option<T::Id>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    state: Shared<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.queue.push_back((self.id, (self.wrap)(response)));
    }
}

fn check_id<T: ActorEntity>(expected: &Option<T::Id>, actual: &T::Id) -> Result<(), String> {
    match expected {
        Some(expected) if expected != actual => {
            Err(format!("expected id {expected}, got {actual}"))
        }
        _ => Ok(()),
    }
}

fn answer<T: ActorEntity>(
    request: ResourceRequest<T>,
    next: Option<(Option<T::Id>, Expectation<T>)>,
) -> Result<(), String> {
    let Some((expected_id, expectation)) = next else {
        return Err(format!("no expectation left for {request:?}"));
    };

    match (request, expectation) {
        (ResourceRequest::Get { id, respond_to }, Expectation::Get(response)) => {
            check_id::<T>(&expected_id, &id)?;
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Create { respond_to, .. }, Expectation::Create(response)) => {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::List { respond_to, .. }, Expectation::List(response)) => {
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Action { id, respond_to, .. }, Expectation::Action(response)) => {
            check_id::<T>(&expected_id, &id)?;
            let _ = respond_to.send(response);
        }
        (request, expectation) => {
            return Err(format!(
                "expected {} request, got {request:?}",
                expectation.name()
            ));
        }
    }
    Ok(())
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// A client plus the receiver its requests arrive on.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request, if it is a Create.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next request, if it is a Get.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<T>, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next request, if it is an Action.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Coupon {
        code: u32,
        percent: u8,
    }

    #[derive(Debug)]
    struct CouponCreate {
        percent: u8,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("coupon error")]
    struct CouponError;

    #[async_trait]
    impl ActorEntity for Coupon {
        type Id = u32;
        type Create = CouponCreate;
        type Action = ();
        type ActionResult = bool;
        type Context = ();
        type Error = CouponError;

        fn from_create_params(code: u32, params: CouponCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                code,
                percent: params.percent,
            })
        }

        async fn handle_action(&mut self, _: (), _: &()) -> Result<bool, Self::Error> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_raw_channel_helpers() {
        let (client, mut receiver) = create_mock_client::<Coupon>(10);

        let create_task =
            tokio::spawn(async move { client.create(CouponCreate { percent: 15 }).await });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.percent, 15);
        responder.send(Ok(9)).unwrap();

        let result = create_task.await.unwrap();
        assert!(matches!(result, Ok(9)));
    }

    #[tokio::test]
    async fn test_expectations_answer_in_order() {
        let mut mock = MockClient::<Coupon>::new();
        mock.expect_create().return_ok(1);
        mock.expect_get(1).return_ok(Some(Coupon {
            code: 1,
            percent: 10,
        }));
        mock.expect_list().return_ok(vec![]);

        let client = mock.client();
        let code = client.create(CouponCreate { percent: 10 }).await.unwrap();
        assert_eq!(code, 1);

        let fetched = client.get(1).await.unwrap().unwrap();
        assert_eq!(fetched.percent, 10);

        assert!(client.list(|_| true).await.unwrap().is_empty());

        mock.verify();
    }

    #[tokio::test]
    async fn test_injected_error_reaches_caller() {
        let mut mock = MockClient::<Coupon>::new();
        mock.expect_action(3).return_err(FrameworkError::ActorClosed);

        let result = mock.client().perform_action(3, ()).await;
        assert!(matches!(result, Err(FrameworkError::ActorClosed)));
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected requests")]
    async fn test_wrong_id_is_reported() {
        let mut mock = MockClient::<Coupon>::new();
        mock.expect_get(1).return_ok(None);

        let result = mock.client().get(2).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
        mock.verify();
    }
}
