//! Typed boundary to the storefront backend.

pub mod backend;
pub mod envelope;
pub mod error;
pub mod http;

pub use backend::{AuthToken, StorefrontBackend};
pub use envelope::{into_ack, into_result, Payload};
pub use error::{ApiResult, StorefrontError};
pub use http::HttpBackend;
