//! Generic actor framework for keyed records.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - trait implemented by records managed by an actor
//! - [`ResourceActor`] - the task that owns a store of records
//! - [`ResourceClient`] - cloneable handle used to send requests
//! - [`ActorClient`] - shared `get`/`find` for typed client wrappers
//! - [`FrameworkError`] - plumbing errors
//!
//! # Testing
//!
//! See [`mock`] for utilities to test clients without spawning real actors.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
