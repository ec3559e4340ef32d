//! Error types for the Wallet actor.

use crate::api::StorefrontError;
use crate::framework::FrameworkError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WalletError {
    #[error("Wallet not found: {0}")]
    NotFound(String),

    #[error("Insufficient wallet balance: requested {requested:.2}, available {available:.2}")]
    InsufficientFunds { requested: f64, available: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for WalletError {
    fn from(e: FrameworkError) -> Self {
        if let Some(inner) = e.entity_error::<WalletError>() {
            return inner.clone();
        }
        match e {
            FrameworkError::NotFound(id) => WalletError::NotFound(id),
            other => WalletError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<WalletError> for StorefrontError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::ActorCommunicationError(msg) => StorefrontError::Transport(msg),
            other => StorefrontError::Backend(other.to_string()),
        }
    }
}
