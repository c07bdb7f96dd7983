//! # API Error Types Module
//!
//! Errors returned by the backend client and the mapping from each failure
//! to the notification shown to the user.

use crate::localization::LocalizationManager;
use crate::recipe_model::ModelError;

/// Errors from talking to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never got a response (connection refused, timeout, DNS)
    Network(String),
    /// The backend answered with a non-success status
    Status { status: u16, message: String },
    /// The response body was not the expected JSON
    Decode(String),
    /// A request body could not be serialized
    Encode(String),
    /// The response decoded but violated the data model
    InvalidData(ModelError),
    /// Too many recent failures; the request was not sent
    CircuitOpen,
    /// An upload payload was rejected before sending
    Upload(String),
    /// Client misconfiguration (bad base URL, invalid token header)
    Config(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network error: {msg}"),
            ApiError::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            ApiError::Decode(msg) => write!(f, "Decode error: {msg}"),
            ApiError::Encode(msg) => write!(f, "Encode error: {msg}"),
            ApiError::InvalidData(err) => write!(f, "Invalid data: {err}"),
            ApiError::CircuitOpen => write!(f, "Backend circuit is open"),
            ApiError::Upload(msg) => write!(f, "Upload rejected: {msg}"),
            ApiError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else if err.is_builder() {
            ApiError::Config(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        ApiError::InvalidData(err)
    }
}

impl ApiError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Localization key of the notification for this error
    pub fn message_key(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "error-network",
            ApiError::Status { status: 401 | 403, .. } => "error-unauthorized",
            ApiError::Status { status: 404, .. } => "error-not-found",
            ApiError::Status { status: 400 | 409 | 422, .. } => "error-validation",
            ApiError::Status { .. } => "error-server",
            ApiError::Decode(_) | ApiError::InvalidData(_) => "error-unexpected-response",
            ApiError::CircuitOpen => "error-service-unavailable",
            ApiError::Upload(_) => "error-upload-invalid",
            ApiError::Encode(_) | ApiError::Config(_) => "error-client",
        }
    }

    /// Localized, non-blocking notification text for this error
    pub fn user_message(&self, localization: &LocalizationManager) -> String {
        let details = match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Upload(msg) => msg.clone(),
            other => other.to_string(),
        };
        localization.t_args(self.message_key(), &[("details", details.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Network("timeout".into()).is_transient());
        assert!(ApiError::Status { status: 503, message: String::new() }.is_transient());
        assert!(ApiError::Status { status: 429, message: String::new() }.is_transient());
        assert!(!ApiError::Status { status: 404, message: String::new() }.is_transient());
        assert!(!ApiError::Decode("bad json".into()).is_transient());
        assert!(!ApiError::CircuitOpen.is_transient());
    }

    #[test]
    fn test_message_keys() {
        assert_eq!(ApiError::Status { status: 401, message: String::new() }.message_key(), "error-unauthorized");
        assert_eq!(ApiError::Status { status: 422, message: String::new() }.message_key(), "error-validation");
        assert_eq!(ApiError::Status { status: 500, message: String::new() }.message_key(), "error-server");
        assert_eq!(ApiError::CircuitOpen.message_key(), "error-service-unavailable");
    }
}
