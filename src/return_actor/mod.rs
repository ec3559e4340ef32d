//! # Return Request Actor
//!
//! Keeps return and cancellation requests. Creation is validated against the
//! order in [`ReturnRecord::on_create`](crate::framework::ActorEntity::on_create),
//! which asks the order actor both whether the order exists for this user and
//! whether it is still eligible. Completing a request credits the refund to the
//! user's wallet.
//!
//! The actor runs with `(OrderClient, WalletClient)` as its context:
//!
//! ```rust,ignore
//! let (return_actor, return_client) = return_actor::new();
//! tokio::spawn(return_actor.run((order_client.clone(), wallet_client.clone())));
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::*;
pub use error::*;

use crate::clients::ReturnClient;
use crate::framework::ResourceActor;

/// Creates a new Return actor and its client.
pub fn new() -> (ResourceActor<ReturnRecord>, ReturnClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, ReturnClient::new(generic_client))
}
