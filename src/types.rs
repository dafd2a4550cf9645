// Error types shared by the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::soundcloud::SoundCloudError;

/// Every way a proxied request can fail, mapped to an HTTP response at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or invalid caller input.
    #[error("{0}")]
    BadRequest(String),

    /// Non-success response from SoundCloud, relayed with the same status.
    #[error("SoundCloud API error: {}", .status.as_u16())]
    Upstream { status: StatusCode, body: String },

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SoundCloudError> for AppError {
    fn from(err: SoundCloudError) -> Self {
        match err {
            SoundCloudError::Api { status, body } => AppError::Upstream {
                status: StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                body,
            },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::BadRequest(message) => json!({ "error": message }),
            AppError::Upstream { status, body } => json!({
                "error": format!("SoundCloud API error: {}", status.as_u16()),
                "details": body,
            }),
            AppError::Internal(message) => json!({
                "error": "Internal server error",
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
