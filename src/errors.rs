use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation {
        required: Vec<&'static str>,
        missing: Vec<&'static str>,
    },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("User not found")]
    UserNotFound { user_id: String },

    #[error("User has no FCM token")]
    MissingToken { user_id: String },

    #[error("No users with FCM tokens")]
    NoRecipients,

    #[error("Upstream request failed")]
    Upstream(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation { .. }
            | GatewayError::InvalidBody(_)
            | GatewayError::MissingToken { .. }
            | GatewayError::NoRecipients => StatusCode::BAD_REQUEST,
            GatewayError::UserNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            GatewayError::Validation { required, missing } => json!({
                "error": "Missing required fields",
                "required": required,
                "missing": missing,
            }),
            GatewayError::InvalidBody(details) => json!({
                "error": "Invalid request body",
                "details": details,
            }),
            GatewayError::UserNotFound { user_id } | GatewayError::MissingToken { user_id } => {
                json!({ "error": self.to_string(), "userId": user_id })
            }
            GatewayError::NoRecipients => json!({ "error": self.to_string() }),
            GatewayError::Upstream(e) => {
                error!(error = %format!("{:#}", e), "Upstream failure while handling request");
                json!({
                    "error": "Failed to process notification request",
                    "details": format!("{:#}", e),
                })
            }
        };

        if status.is_client_error() {
            warn!(status = status.as_u16(), error = %self, "Rejected request");
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_status_codes() {
        let validation = GatewayError::Validation {
            required: vec!["title", "body"],
            missing: vec!["body"],
        };

        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::InvalidBody("expected a map".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::UserNotFound { user_id: "u1".to_string() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::MissingToken { user_id: "u1".to_string() }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(GatewayError::NoRecipients.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::from(anyhow!("FCM request failed")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_names_missing_fields() {
        let error = GatewayError::Validation {
            required: vec!["topic", "title", "body"],
            missing: vec!["topic", "body"],
        };

        assert_eq!(error.to_string(), "Missing required fields: topic, body");
    }
}
