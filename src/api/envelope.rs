//! # Response Envelope
//!
//! The backend wraps every answer as `{ "success": bool, <payload>, "error": ... }`.
//! Payload keys differ per endpoint (`orders`, `order`, `wallet`, ...) and the
//! eligibility endpoint puts its fields inline. Everything is turned into an
//! [`ApiResult`] here; nothing past this module sees the raw shape.

use crate::api::error::{ApiResult, StorefrontError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Where the payload sits in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Under this key, falling back to `data`.
    Field(&'static str),
    /// Alongside `success` at the top level.
    Inline,
}

const FALLBACK_KEY: &str = "data";
const DEFAULT_FAILURE: &str = "Request failed";

/// Decode an envelope into its payload.
pub fn into_result<T: DeserializeOwned>(body: Value, payload: Payload) -> ApiResult<T> {
    let fields = checked(body)?;
    let value = match payload {
        Payload::Field(key) => {
            let mut fields = fields;
            fields
                .remove(key)
                .or_else(|| fields.remove(FALLBACK_KEY))
                .filter(|value| !value.is_null())
                .ok_or_else(|| StorefrontError::Malformed(format!("missing `{key}` payload")))?
        }
        Payload::Inline => Value::Object(fields),
    };
    serde_json::from_value(value).map_err(|e| StorefrontError::Malformed(e.to_string()))
}

/// Decode an envelope whose only content is the outcome.
pub fn into_ack(body: Value) -> ApiResult<()> {
    checked(body).map(|_| ())
}

// Verifies `success` and returns the remaining fields.
fn checked(body: Value) -> ApiResult<Map<String, Value>> {
    let Value::Object(mut fields) = body else {
        return Err(StorefrontError::Malformed("envelope is not an object".into()));
    };
    let success = fields
        .remove("success")
        .and_then(|value| value.as_bool())
        .ok_or_else(|| StorefrontError::Malformed("missing `success` flag".into()))?;
    if success {
        return Ok(fields);
    }
    let message = ["error", "message"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(error_text))
        .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
    tracing::debug!(%message, "Backend reported failure");
    Err(StorefrontError::Backend(message))
}

// `error` is a string on most endpoints and `{ "message": ... }` on a few.
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(inner) => inner.get("message").and_then(error_text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Eligibility, WalletDetails};
    use serde_json::json;

    #[test]
    fn test_field_payload() {
        let wallet: WalletDetails =
            into_result(json!({"success": true, "wallet": {"balance": 120.5}}), Payload::Field("wallet"))
                .unwrap();
        assert_eq!(wallet.balance, 120.5);
    }

    #[test]
    fn test_data_key_fallback() {
        let wallet: WalletDetails =
            into_result(json!({"success": true, "data": {"balance": 3.0}}), Payload::Field("wallet"))
                .unwrap();
        assert_eq!(wallet.balance, 3.0);
    }

    #[test]
    fn test_inline_payload() {
        let eligibility: Eligibility = into_result(
            json!({"success": true, "can_return": false, "can_cancel": true, "reason": "Not shipped yet"}),
            Payload::Inline,
        )
        .unwrap();
        assert!(eligibility.can_cancel);
        assert!(!eligibility.can_return);
        assert_eq!(eligibility.reason, "Not shipped yet");
    }

    #[test]
    fn test_failure_becomes_backend_error() {
        let result: ApiResult<WalletDetails> = into_result(
            json!({"success": false, "error": "Wallet not found"}),
            Payload::Field("wallet"),
        );
        assert_eq!(result, Err(StorefrontError::Backend("Wallet not found".into())));

        let nested = into_ack(json!({"success": false, "error": {"message": "Too late"}}));
        assert_eq!(nested, Err(StorefrontError::Backend("Too late".into())));

        let bare = into_ack(json!({"success": false}));
        assert_eq!(bare, Err(StorefrontError::Backend("Request failed".into())));
    }

    #[test]
    fn test_malformed_envelopes() {
        let no_flag: ApiResult<WalletDetails> =
            into_result(json!({"wallet": {"balance": 1.0}}), Payload::Field("wallet"));
        assert!(matches!(no_flag, Err(StorefrontError::Malformed(_))));

        let no_payload: ApiResult<WalletDetails> =
            into_result(json!({"success": true}), Payload::Field("wallet"));
        assert!(matches!(no_payload, Err(StorefrontError::Malformed(_))));

        let null_payload: ApiResult<WalletDetails> =
            into_result(json!({"success": true, "wallet": null}), Payload::Field("wallet"));
        assert!(matches!(null_payload, Err(StorefrontError::Malformed(_))));

        let wrong_shape: ApiResult<WalletDetails> =
            into_result(json!({"success": true, "wallet": "rich"}), Payload::Field("wallet"));
        assert!(matches!(wrong_shape, Err(StorefrontError::Malformed(_))));

        assert!(matches!(into_ack(json!([1, 2])), Err(StorefrontError::Malformed(_))));
    }

    #[test]
    fn test_ack() {
        assert_eq!(into_ack(json!({"success": true, "message": "Cancelled"})), Ok(()));
    }
}
