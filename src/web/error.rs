//! HTTP mapping of [`Error`].
//!
//! Every failure becomes a JSON body `{"error": "..."}` with a matching status.
//! Store and server faults are logged and answered with a generic message.

use crate::errors::Error;
use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidPrice { .. } | Self::Image { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::MenuItemNotFound { .. } | Self::OrderNotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidTransition { .. } | Self::NoNextStatus { .. } => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) | Self::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<MultipartError> for Error {
    fn from(e: MultipartError) -> Self {
        Self::validation(format!("Invalid upload: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::OrderStatus;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::OrderNotFound { id: "1".into() }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Cancelled
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(Error::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::Database("disk full".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() -> crate::errors::Result<()> {
        let response = Error::Database("secret table name".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| Error::validation(e.to_string()))?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        assert_eq!(json["error"], "Internal server error");
        Ok(())
    }
}
