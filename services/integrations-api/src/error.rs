//! HTTP-facing error type
//!
//! Library errors are mapped to a status code and a `{"detail": "..."}` body.
//! Client mistakes and provider rejections are 400, transport failures talking
//! to HubSpot are 502, store failures are 500.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.detail)
    }
}

impl From<hubspot_auth::Error> for ApiError {
    fn from(err: hubspot_auth::Error) -> Self {
        let detail = err.to_string();
        if err.is_client_error() {
            Self::bad_request(detail)
        } else if matches!(err, hubspot_auth::Error::Store(_)) {
            Self::internal(detail)
        } else {
            Self::bad_gateway(detail)
        }
    }
}

impl From<hubspot_items::Error> for ApiError {
    fn from(err: hubspot_items::Error) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            Self::bad_gateway(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), detail = %self.detail, "request failed");
        } else {
            warn!(status = self.status.as_u16(), detail = %self.detail, "request rejected");
        }
        let body = serde_json::json!({ "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}
