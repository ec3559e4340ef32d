//! # Generic Messages
//!
//! Requests sent from a [`ResourceClient`](crate::framework::ResourceClient) to its
//! [`ResourceActor`](crate::framework::ResourceActor).

use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use tokio::sync::oneshot;

/// One-shot reply channel used by every request.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Predicate used by `List` requests.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Request sent to a `ResourceActor`.
///
/// Create, get and delete plus three extras:
///
/// - **List**: every record matching a predicate, in insertion order.
/// - **Put**: insert or replace a record under a caller-supplied id. The incoming
///   value always wins over what is stored; this is how remote data overwrites
///   cached copies.
/// - **Action**: resource-specific operation ([`ActorEntity::Action`]).
///
/// `Shutdown` stops the actor even while other clients are still alive.
/// Requests queued behind it are dropped unanswered.
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
    Put {
        id: T::Id,
        entity: T,
        respond_to: Response<Option<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Shutdown {
        respond_to: Response<()>,
    },
}

impl<T: ActorEntity> std::fmt::Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceRequest::Create { params, .. } => {
                f.debug_struct("Create").field("params", params).finish()
            }
            ResourceRequest::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            ResourceRequest::List { .. } => f.debug_struct("List").finish_non_exhaustive(),
            ResourceRequest::Put { id, .. } => f.debug_struct("Put").field("id", id).finish(),
            ResourceRequest::Delete { id, .. } => {
                f.debug_struct("Delete").field("id", id).finish()
            }
            ResourceRequest::Action { id, action, .. } => f
                .debug_struct("Action")
                .field("id", id)
                .field("action", action)
                .finish(),
            ResourceRequest::Shutdown { .. } => f.write_str("Shutdown"),
        }
    }
}
