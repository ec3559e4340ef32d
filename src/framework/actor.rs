//! # Generic Actor Server
//!
//! The `ResourceActor` owns a keyed store of entities and processes requests one at
//! a time on its own Tokio task. Exclusive ownership of the store by the task is
//! what replaces locks.

use crate::framework::client::ResourceClient;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type IdSource<I> = Box<dyn FnMut() -> I + Send>;

/// The server half of an actor: the receiver plus the state it guards.
///
/// # Usage Pattern
///
/// 1. **Create**: [`ResourceActor::new`] (sequential ids) or [`ResourceActor::keyed`]
///    (caller-supplied ids via `put`) returns the actor and a cloneable client.
/// 2. **Wire**: pass dependencies into `run(context)`.
/// 3. **Run**: spawn `run` on a task. The loop ends when every client is dropped
///    or one of them calls `shutdown`.
///
/// ```rust
/// use storefront_orders::framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Note { id: u32, text: String }
/// #[derive(Debug)] struct NoteCreate(String);
/// #[derive(Debug)] struct NoteError;
/// impl std::fmt::Display for NoteError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "note error") }
/// }
/// impl std::error::Error for NoteError {}
///
/// #[async_trait]
/// impl ActorEntity for Note {
///     type Id = u32; type Create = NoteCreate;
///     type Action = String; type ActionResult = (); type Context = (); type Error = NoteError;
///     fn from_create_params(id: u32, params: NoteCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, text: params.0 })
///     }
///     async fn handle_action(&mut self, text: String, _: &()) -> Result<(), Self::Error> {
///         self.text = text;
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Note>::new(10);
///     tokio::spawn(actor.run(()));
///     let id = client.create(NoteCreate("hello".into())).await.unwrap();
///     assert_eq!(client.get(id).await.unwrap().unwrap().text, "hello");
/// }
/// ```
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    // insertion order, for List
    order: Vec<T::Id>,
    next_id: Option<IdSource<T::Id>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Actor whose `create` allocates ids 1, 2, 3, ...
    ///
    /// `buffer_size` is the channel capacity; clients wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>)
    where
        T::Id: From<u32>,
    {
        let mut counter: u32 = 1;
        let source: IdSource<T::Id> = Box::new(move || {
            let id = T::Id::from(counter);
            counter += 1;
            id
        });
        Self::build(buffer_size, Some(source))
    }

    /// Actor without an id source. Records are inserted with `put`; `create`
    /// fails with [`FrameworkError::NoIdSource`].
    pub fn keyed(buffer_size: usize) -> (Self, ResourceClient<T>) {
        Self::build(buffer_size, None)
    }

    fn build(buffer_size: usize, next_id: Option<IdSource<T::Id>>) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            next_id,
        };
        (actor, ResourceClient::new(sender))
    }

    fn insert(&mut self, id: T::Id, item: T) -> Option<T> {
        let previous = self.store.insert(id.clone(), item);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    fn remove(&mut self, id: &T::Id) {
        if self.store.remove(id).is_some() {
            self.order.retain(|stored| stored != id);
        }
    }

    /// Runs the event loop until the channel closes or a `Shutdown` arrives.
    ///
    /// `context` is handed to every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // "Order" rather than "storefront_orders::order_actor::entity::OrderRecord"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    // params may carry bank details; they are never logged
                    debug!(entity_type, "Create");
                    let Some(next_id) = self.next_id.as_mut() else {
                        warn!(entity_type, "Create on keyed actor");
                        let _ = respond_to.send(Err(FrameworkError::NoIdSource));
                        continue;
                    };
                    let id = next_id();

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.insert(id.clone(), item);
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List {
                    filter: predicate,
                    respond_to,
                } => {
                    let items: Vec<T> = self
                        .order
                        .iter()
                        .filter_map(|id| self.store.get(id))
                        .filter(|item| predicate(*item))
                        .cloned()
                        .collect();
                    debug!(entity_type, matched = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Put {
                    id,
                    entity,
                    respond_to,
                } => {
                    let previous = self.insert(id.clone(), entity);
                    debug!(entity_type, %id, replaced = previous.is_some(), "Put");
                    let _ = respond_to.send(Ok(previous));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete(&context).await {
                            warn!(entity_type, %id, error = %e, "on_delete failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        self.remove(&id);
                        info!(entity_type, %id, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(_) => info!(entity_type, %id, "Action ok"),
                            Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Shutdown { respond_to } => {
                    info!(entity_type, "Shutdown requested");
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Parcel {
        id: u32,
        label: String,
        scans: u32,
    }

    #[derive(Debug)]
    struct ParcelCreate {
        label: String,
    }

    #[derive(Debug)]
    enum ParcelAction {
        Scan,
        Relabel(String),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("parcel label must not be empty")]
    struct EmptyLabel;

    #[async_trait]
    impl ActorEntity for Parcel {
        type Id = u32;
        type Create = ParcelCreate;
        type Action = ParcelAction;
        type ActionResult = u32;
        type Context = ();
        type Error = EmptyLabel;

        fn from_create_params(id: u32, params: ParcelCreate) -> Result<Self, Self::Error> {
            if params.label.is_empty() {
                return Err(EmptyLabel);
            }
            Ok(Self {
                id,
                label: params.label,
                scans: 0,
            })
        }

        async fn handle_action(
            &mut self,
            action: ParcelAction,
            _ctx: &(),
        ) -> Result<u32, Self::Error> {
            match action {
                ParcelAction::Scan => {
                    self.scans += 1;
                    Ok(self.scans)
                }
                ParcelAction::Relabel(label) => {
                    self.label = label;
                    Ok(self.scans)
                }
            }
        }
    }

    fn parcel(id: u32, label: &str) -> Parcel {
        Parcel {
            id,
            label: label.to_string(),
            scans: 0,
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (actor, client) = ResourceActor::<Parcel>::new(10);
        tokio::spawn(actor.run(()));

        let id = client
            .create(ParcelCreate {
                label: "box".into(),
            })
            .await
            .unwrap();
        assert_eq!(id, 1);

        let scans = client.perform_action(id, ParcelAction::Scan).await.unwrap();
        assert_eq!(scans, 1);

        client
            .perform_action(id, ParcelAction::Relabel("crate".into()))
            .await
            .unwrap();
        let relabelled = client.get(id).await.unwrap().unwrap();
        assert_eq!(relabelled.label, "crate");
        assert_eq!(relabelled.scans, 1);

        client.delete(id).await.unwrap();
        assert!(client.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejected_by_entity_is_not_stored() {
        let (actor, client) = ResourceActor::<Parcel>::new(10);
        tokio::spawn(actor.run(()));

        let result = client.create(ParcelCreate { label: "".into() }).await;
        let err = result.unwrap_err();
        assert!(err.entity_error::<EmptyLabel>().is_some());

        let all = client.list(|_| true).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_put_replaces_and_list_keeps_insertion_order() {
        let (actor, client) = ResourceActor::<Parcel>::keyed(10);
        tokio::spawn(actor.run(()));

        assert!(client.put(7, parcel(7, "first")).await.unwrap().is_none());
        assert!(client.put(3, parcel(3, "second")).await.unwrap().is_none());

        let previous = client.put(7, parcel(7, "remote")).await.unwrap();
        assert_eq!(previous.unwrap().label, "first");

        let labels: Vec<String> = client
            .list(|_| true)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(labels, vec!["remote", "second"]);

        let filtered = client.list(|p| p.id == 3).await.unwrap();
        assert_eq!(filtered.len(), 1);
    }

    #[tokio::test]
    async fn test_keyed_actor_rejects_create() {
        let (actor, client) = ResourceActor::<Parcel>::keyed(10);
        tokio::spawn(actor.run(()));

        let result = client
            .create(ParcelCreate {
                label: "box".into(),
            })
            .await;
        assert!(matches!(result, Err(FrameworkError::NoIdSource)));
    }

    #[tokio::test]
    async fn test_shutdown_stops_actor_while_clients_live() {
        let (actor, client) = ResourceActor::<Parcel>::new(10);
        let handle = tokio::spawn(actor.run(()));
        let other = client.clone();

        client.shutdown().await.unwrap();
        handle.await.unwrap();

        let result = other.get(1).await;
        assert!(matches!(result, Err(FrameworkError::ActorClosed)));
    }

    #[tokio::test]
    async fn test_missing_record_reports_not_found() {
        let (actor, client) = ResourceActor::<Parcel>::new(10);
        tokio::spawn(actor.run(()));

        let result = client.perform_action(42, ParcelAction::Scan).await;
        assert!(matches!(result, Err(FrameworkError::NotFound(id)) if id == "42"));
    }
}
