use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const CODE_OK: i64 = 0;
pub const CODE_UNAUTHORIZED: i64 = 401;

/// Message used when an error envelope carries none.
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed.";

/// Body shape shared by every API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Parses `body`, or `None` if it is not an envelope.
    #[must_use]
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// Normalized error for a non-zero code.
    #[must_use]
    pub fn to_error(&self) -> ApiError {
        ApiError {
            code: self.code,
            message: self
                .message
                .as_deref()
                .map(str::trim)
                .filter(|message| !message.is_empty())
                .unwrap_or(DEFAULT_ERROR_MESSAGE)
                .to_string(),
        }
    }
}

/// Error surfaced to callers: an application code from the envelope, or the
/// HTTP status (0 when there was no response) for transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("request failed ({code}): {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_reads_code_message_and_data() {
        let envelope = Envelope::parse(br#"{"code":0,"data":{"id":3}}"#);
        assert!(envelope.as_ref().is_some_and(Envelope::is_ok));
        assert_eq!(
            envelope.and_then(|e| e.data),
            Some(json!({ "id": 3 }))
        );

        let envelope = Envelope::parse(br#"{"code":7,"message":"boom"}"#);
        assert_eq!(
            envelope.map(|e| e.to_error()),
            Some(ApiError::new(7, "boom"))
        );
    }

    #[test]
    fn parse_rejects_non_envelopes() {
        assert!(Envelope::parse(b"").is_none());
        assert!(Envelope::parse(b"<html></html>").is_none());
        assert!(Envelope::parse(br#"{"message":"no code"}"#).is_none());
        assert!(Envelope::parse(br#""ok""#).is_none());
    }

    #[test]
    fn blank_message_falls_back() {
        let envelope = Envelope::parse(br#"{"code":9,"message":"  "}"#);
        assert_eq!(
            envelope.map(|e| e.to_error()),
            Some(ApiError::new(9, DEFAULT_ERROR_MESSAGE))
        );
    }

    #[test]
    fn api_error_serializes_as_code_and_message() {
        let value = serde_json::to_value(ApiError::new(7, "boom")).ok();
        assert_eq!(value, Some(json!({ "code": 7, "message": "boom" })));
    }
}
