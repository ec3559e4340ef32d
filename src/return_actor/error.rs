//! Error types for the Return actor.

use crate::api::StorefrontError;
use crate::framework::FrameworkError;
use crate::model::ReturnStatus;
use crate::order_actor::OrderError;
use crate::wallet_actor::WalletError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReturnError {
    #[error("Return request not found: {0}")]
    NotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order is not eligible: {0}")]
    NotEligible(String),

    #[error("A request is already open for {0}")]
    AlreadyRequested(String),

    #[error("Request is {status} and cannot be {attempted}")]
    InvalidTransition {
        status: ReturnStatus,
        attempted: &'static str,
    },

    #[error("Return validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ReturnError {
    fn from(e: FrameworkError) -> Self {
        if let Some(inner) = e.entity_error::<ReturnError>() {
            return inner.clone();
        }
        match e {
            FrameworkError::NotFound(id) => ReturnError::NotFound(id),
            other => ReturnError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<ReturnError> for StorefrontError {
    fn from(e: ReturnError) -> Self {
        match e {
            ReturnError::ActorCommunicationError(msg) => StorefrontError::Transport(msg),
            ReturnError::Order(inner) => inner.into(),
            ReturnError::Wallet(inner) => inner.into(),
            ReturnError::NotFound(_) => StorefrontError::Backend("Return request not found".into()),
            other => StorefrontError::Backend(other.to_string()),
        }
    }
}
