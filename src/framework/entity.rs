//! # ActorEntity Trait
//!
//! The contract every record kept by a [`ResourceActor`](crate::framework::ResourceActor)
//! must satisfy. The storefront uses it in two places:
//!
//! - the in-process backend, where orders, return requests and wallets each live in
//!   their own actor;
//! - the session's advisory cache, where locally mirrored values are kept by key.
//!
//! Associated types pin down the payload of every request, so a `ReturnCreate`
//! can never be sent to the wallet actor.
//!
//! # Provided Methods (Hooks)
//! [`ActorEntity::on_create`] and [`ActorEntity::on_delete`] default to `Ok(())`.
//! Override them when creation or removal has to consult other actors through
//! the injected `Context`.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A record managed by a `ResourceActor`.
///
/// # Async & Context
/// Hooks are `async` so they can call other actors. The `Context` is handed to
/// `run()` rather than `new()`, which lets actors that depend on each other be
/// constructed in any order and wired afterwards.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Key the record is stored under.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Payload for `Create`.
    type Create: Send + Sync + Debug;

    /// Resource-specific operations (e.g. `AdvanceStatus`, `Debit`).
    type Action: Send + Sync + Debug;

    /// Result of a custom action.
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected at `run()`. Use `()` when there are none.
    type Context: Send + Sync;

    /// One error enum per actor rather than one per action; clients match on a
    /// single type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the record from its freshly allocated id and the create payload.
    /// Runs before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Runs after construction and before the record is stored. An error here
    /// aborts the create and nothing is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs before the record is removed. An error keeps the record.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
