use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GENERIC_SERVER_ERROR: &str = "Server error occurred";
pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Please check if the backend is running.";
pub const CONNECTION_ERROR_DETAILS: &str = "Connection error";
pub const REQUEST_SETUP_MESSAGE: &str = "Request error occurred";

/// Where a failed call broke down. Never shown to the user; UI code only reads
/// the normalized fields of [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiErrorKind {
    /// The service answered with a non-2xx status (or an undecodable body).
    #[default]
    Server,
    /// The request went out but nothing came back: timeout, refused, DNS.
    Connection,
    /// The request could not be built or sent at all.
    RequestSetup,
}

/// The single error shape every adapter failure collapses into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ApiError {
    #[serde(skip)]
    pub kind: ApiErrorKind,
    pub message: String,
    pub details: String,
    pub status: u16,
}

impl ApiError {
    /// Non-2xx response. Missing or blank server text falls back to the generic message.
    pub fn server(status: u16, error: Option<String>, details: Option<String>) -> Self {
        Self {
            kind: ApiErrorKind::Server,
            message: error
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string()),
            details: details.unwrap_or_default(),
            status,
        }
    }

    pub fn connection() -> Self {
        Self {
            kind: ApiErrorKind::Connection,
            message: NO_RESPONSE_MESSAGE.to_string(),
            details: CONNECTION_ERROR_DETAILS.to_string(),
            status: 0,
        }
    }

    pub fn request_setup(details: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::RequestSetup,
            message: REQUEST_SETUP_MESSAGE.to_string(),
            details: details.into(),
            status: 0,
        }
    }

    /// Builds a server error from a JSON error body of the form
    /// `{ "error": ..., "details": ... }`. Structured details are kept as compact JSON.
    pub fn from_error_body(status: u16, body: &serde_json::Value) -> Self {
        let error = body.get("error").and_then(value_text);
        let details = body.get("details").and_then(value_text);
        Self::server(status, error, details)
    }
}

fn value_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(false) => None,
        serde_json::Value::String(text) if text.is_empty() => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_error_keeps_supplied_text() {
        let err = ApiError::from_error_body(
            500,
            &json!({ "error": "Prediction failed", "details": "model not loaded" }),
        );
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.message, "Prediction failed");
        assert_eq!(err.details, "model not loaded");
        assert_eq!(err.status, 500);
    }

    #[test]
    fn server_error_without_text_uses_generic_message() {
        let err = ApiError::from_error_body(502, &json!({ "error": "" }));
        assert_eq!(err.message, GENERIC_SERVER_ERROR);
        assert_eq!(err.details, "");
        assert_eq!(err.status, 502);
    }

    #[test]
    fn structured_details_render_as_json_text() {
        let err = ApiError::from_error_body(
            400,
            &json!({
                "error": "Invalid input data",
                "details": { "bedrooms": ["Ensure this value is less than or equal to 10."] }
            }),
        );
        assert_eq!(
            err.details,
            r#"{"bedrooms":["Ensure this value is less than or equal to 10."]}"#
        );
    }

    #[test]
    fn connection_error_has_fixed_shape() {
        let err = ApiError::connection();
        assert_eq!(err.message, NO_RESPONSE_MESSAGE);
        assert_eq!(err.details, CONNECTION_ERROR_DETAILS);
        assert_eq!(err.status, 0);
        assert_eq!(err.to_string(), NO_RESPONSE_MESSAGE);
    }

    #[test]
    fn serializes_without_kind() {
        let value = serde_json::to_value(ApiError::request_setup("relative URL without a base"))
            .expect("serialize");
        assert_eq!(
            value,
            json!({
                "message": REQUEST_SETUP_MESSAGE,
                "details": "relative URL without a base",
                "status": 0
            })
        );
    }
}
