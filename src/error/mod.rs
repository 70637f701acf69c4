//! Error handling module

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Authentication failed: {kind}: {message}")]
    Authentication { kind: String, message: String },

    #[error("Not authenticated: login before fetching devices")]
    NotAuthenticated,

    #[error("Device directory fetch failed{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    DirectoryFetch {
        status: Option<u16>,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            BridgeError::Authentication { .. }
                | BridgeError::NotAuthenticated
                | BridgeError::DirectoryFetch { .. }
                | BridgeError::Parse(_)
        )
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            BridgeError::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_fetch_display_with_status() {
        let err = BridgeError::DirectoryFetch {
            status: Some(503),
            message: "maintenance".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Device directory fetch failed (503): maintenance"
        );
    }

    #[test]
    fn test_directory_fetch_display_transport() {
        let err = BridgeError::DirectoryFetch {
            status: None,
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Device directory fetch failed: connection refused"
        );
    }

    #[test]
    fn test_response_status_mapping() {
        let resp = BridgeError::NotFound("accessory".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = BridgeError::NotAuthenticated.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = BridgeError::Config("account.email".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
