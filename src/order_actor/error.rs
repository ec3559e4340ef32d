//! Error types for the Order actor.

use crate::api::StorefrontError;
use crate::framework::FrameworkError;
use crate::model::OrderStatus;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order is {status} and cannot be {attempted}")]
    InvalidTransition {
        status: OrderStatus,
        attempted: &'static str,
    },

    #[error("Order validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        if let Some(inner) = e.entity_error::<OrderError>() {
            return inner.clone();
        }
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<OrderError> for StorefrontError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::ActorCommunicationError(msg) => StorefrontError::Transport(msg),
            OrderError::NotFound(_) => StorefrontError::Backend("Order not found".into()),
            other => StorefrontError::Backend(other.to_string()),
        }
    }
}
