use crate::shared::AuditError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
}

/// API Error Types
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A pipeline step failed; `kind` is the audit error label
    #[error("{message}")]
    Pipeline { kind: &'static str, message: String },

    #[error("Service check failed: {0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Pipeline { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &str {
        match self {
            ApiError::Pipeline { kind, .. } => *kind,
            ApiError::ServiceUnavailable(_) => "service_unavailable",
        }
    }

    /// Wraps a failed service check
    pub fn service_unavailable(err: anyhow::Error) -> Self {
        ApiError::ServiceUnavailable(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let kind = err
            .downcast_ref::<AuditError>()
            .map(AuditError::kind)
            .unwrap_or("internal");
        ApiError::Pipeline {
            kind,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::warn!(status = status.as_u16(), error = %self, "request failed");

        let body = ApiErrorResponse {
            status: status.as_u16(),
            error: self.error_code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_maps_to_500_with_kind() {
        let err: anyhow::Error = AuditError::Directory {
            status: 503,
            url: "https://graph.example/v1.0/applications".to_string(),
        }
        .into();
        let api = ApiError::from(err);

        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error_code(), "directory");
        assert!(api.to_string().contains("503"));
    }

    #[test]
    fn test_untyped_error_is_internal() {
        let api = ApiError::from(anyhow::anyhow!("boom"));
        assert_eq!(api.error_code(), "internal");
    }

    #[test]
    fn test_service_unavailable() {
        let api = ApiError::service_unavailable(AuditError::delivery("smtp down").into());
        assert_eq!(api.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
