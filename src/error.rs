// HTTP-facing error taxonomy.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::engine::geo::CoordinateError;
use crate::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was malformed or violated an input invariant.
    #[error("{0}")]
    Validation(String),
    /// The process is missing configuration a feature needs (e.g. the model key).
    #[error("{0}")]
    Config(String),
    /// The external language model failed.
    #[error(transparent)]
    Upstream(#[from] LlmError),
    #[error("Not Found")]
    NotFound,
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            // Wire contract: a missing model key is reported as 500.
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<CoordinateError> for ApiError {
    fn from(e: CoordinateError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Upstream(e) => tracing::error!("Language model error: {e}"),
            ApiError::Config(msg) => tracing::error!("Configuration error: {msg}"),
            ApiError::Validation(msg) => tracing::debug!("Rejected request: {msg}"),
            ApiError::NotFound => {}
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Config("GEMINI_API_KEY is not set".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(LlmError::Timeout).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_detail_body() {
        let response = ApiError::validation("No zones provided").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "detail": "No zones provided" }));
    }

    #[test]
    fn test_coordinate_error_is_validation() {
        let err: ApiError = CoordinateError::Latitude(100.0).into();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
