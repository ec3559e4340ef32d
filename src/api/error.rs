//! Errors surfaced by the storefront boundary.

use thiserror::Error;

/// Every way a backend call or a client-side check can fail.
///
/// None of these is fatal: each view decides how to degrade.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorefrontError {
    /// The request never got an answer (connection, DNS, timeout).
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Backend(String),

    /// Missing, expired or rejected bearer token.
    #[error("Please log in to continue")]
    Unauthorized,

    /// Rejected before anything was sent.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// The envelope lacked `success` or its payload, or the payload had the wrong shape.
    #[error("Unexpected response from server: {0}")]
    Malformed(String),
}

pub type ApiResult<T> = Result<T, StorefrontError>;

impl StorefrontError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StorefrontError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether offering a manual retry makes sense.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorefrontError::Transport(_) | StorefrontError::Malformed(_)
        )
    }

    /// Text shown inline next to the failed view.
    pub fn user_message(&self) -> String {
        match self {
            StorefrontError::Transport(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for StorefrontError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StorefrontError::Malformed(e.to_string())
        } else if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED) {
            StorefrontError::Unauthorized
        } else {
            StorefrontError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_only_for_transient_failures() {
        assert!(StorefrontError::Transport("reset".into()).is_retryable());
        assert!(StorefrontError::Malformed("no success".into()).is_retryable());
        assert!(!StorefrontError::Unauthorized.is_retryable());
        assert!(!StorefrontError::Backend("Order not found".into()).is_retryable());
        assert!(!StorefrontError::validation("reason", "required").is_retryable());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            StorefrontError::Backend("Order already cancelled".into()).user_message(),
            "Order already cancelled"
        );
        assert_eq!(
            StorefrontError::validation("ifsc_code", "IFSC code is required").user_message(),
            "ifsc_code: IFSC code is required"
        );
        assert!(StorefrontError::Transport("dns".into())
            .user_message()
            .contains("try again"));
    }
}
