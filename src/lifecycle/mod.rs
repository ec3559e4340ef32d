//! # System Lifecycle
//!
//! Starting, wiring and stopping the in-process backend, plus tracing setup.
//!
//! [`MemoryBackend::start`] follows the usual actor wiring order:
//!
//! 1. Create every actor and its client. Nothing depends on anything yet.
//! 2. Spawn each actor with its dependencies passed to `run(context)`. The return
//!    actor receives `(OrderClient, WalletClient)`; the others take `()`.
//! 3. On [`MemoryBackend::shutdown`], drop the clients and await the tasks. The
//!    dependency graph is acyclic, so channel closure is enough to stop every actor.

pub mod memory_backend;
pub mod tracing;

pub use memory_backend::*;
pub use self::tracing::setup_tracing;
