//! # Storefront Orders
//!
//! Client-side core of a storefront's order, return and wallet screens.
//!
//! The backend owns every decision that matters (status, eligibility, refunds).
//! This crate derives what the screens show from what the backend says:
//!
//! - **Tracking**: the five-step timeline and the Active / Delivered / Returned
//!   tab of each order ([`projector::project`], [`projector::display_bucket`]).
//! - **Eligibility**: which return or cancel actions to enable, straight from the
//!   backend's answer ([`projector::ActionGate`]).
//! - **Totals**: one function for every subtotal, shipping fee and total that is
//!   shown or submitted ([`projector::compute`]).
//!
//! ## Module Tour
//!
//! ### 1. Boundary ([`api`], [`model`], [`config`])
//! [`StorefrontBackend`](api::StorefrontBackend) is the only way to reach the
//! backend. Responses are decoded from their `{success, ..., error}` envelope into
//! [`ApiResult`](api::ApiResult) before anyone else sees them.
//!
//! ### 2. Session ([`session`])
//! A [`Session`](session::Session) is created at login and torn down at logout. It
//! owns the token, the [advisory cache](session::AdvisoryCache) and every
//! [poller](session::PollHandle). Views take its [`SessionContext`](session::SessionContext).
//!
//! ### 3. Screens ([`views`])
//! Orders, return requests, checkout and wallet. Each degrades on its own when
//! its backend calls fail.
//!
//! ### 4. In-process backend ([`framework`], [`order_actor`], [`return_actor`],
//! [`wallet_actor`], [`clients`], [`lifecycle`])
//! A [`MemoryBackend`](lifecycle::MemoryBackend) built from one
//! [`ResourceActor`](framework::ResourceActor) per resource. Used by the demo
//! binary and the tests; it follows the same rules as the hosted backend
//! (7-day return window, cancel before shipment, refunds to the wallet).
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod api;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod projector;
pub mod return_actor;
pub mod session;
pub mod views;
pub mod wallet_actor;
