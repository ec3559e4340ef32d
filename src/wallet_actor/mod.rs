//! # Wallet Actor
//!
//! One wallet per user: a balance plus its transaction history. Debits that
//! would overdraw the wallet are rejected; refunds arrive as credits from the
//! return actor.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::*;
pub use error::*;

use crate::clients::WalletClient;
use crate::framework::ResourceActor;

/// Creates a new Wallet actor and its client.
pub fn new() -> (ResourceActor<WalletRecord>, WalletClient) {
    let (actor, generic_client) = ResourceActor::new(32);
    (actor, WalletClient::new(generic_client))
}
