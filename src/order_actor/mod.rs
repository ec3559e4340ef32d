//! # Order Actor
//!
//! Keeps the in-process backend's orders. Besides CRUD it owns the fulfilment
//! transitions and answers eligibility questions, since both depend only on the
//! order's own state.
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`OrderRecord`]
//! - [`actions`] - [`OrderAction`] / [`OrderActionResult`]
//! - [`error`] - [`OrderError`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new() -> (ResourceActor<OrderRecord>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, OrderClient::new(generic_client))
}
