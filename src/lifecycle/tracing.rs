//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run                    # lifecycle events only
//! RUST_LOG=debug cargo run                   # request payloads and responses
//! RUST_LOG=storefront_orders::api=debug cargo run
//! ```
//!
//! Actors log their lifecycle with an `entity_type` field (`OrderRecord`,
//! `ReturnRecord`, ...) and clients open a span per call via `#[instrument]`,
//! so a return request reads as one nested trace:
//!
//! ```text
//! INFO create_return{order_id=order_1}: Sending create_return to actor
//! DEBUG create_return{order_id=order_1}: Validating order for return request
//! INFO Created entity_type="ReturnRecord" id=return_1
//! ```
//!
//! Bearer tokens are never recorded: [`AuthToken`](crate::api::AuthToken) redacts
//! itself in `Debug` and HTTP calls skip it in their spans.

/// Installs the global subscriber. Later calls are ignored.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
