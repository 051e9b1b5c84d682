use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::ServiceError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Generation and decode failures. The message is shown to the user as-is.
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn session_not_found(id: uuid::Uuid) -> Self {
        AppError::NotFound(format!("Session {id} not found"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Service(e) => {
                tracing::error!("Generation error: {e}");
                let code = match e {
                    ServiceError::Generation(_) => "GENERATION_ERROR",
                    ServiceError::Decode(_) => "DECODE_ERROR",
                };
                (StatusCode::BAD_GATEWAY, code, e.to_string())
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    e.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::GenerationError;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_generation_error_is_bad_gateway_with_full_message() {
        let error = AppError::from(ServiceError::from(GenerationError::AllModelsFailed {
            last_error: "timed out".to_string(),
        }));
        let (status, body) = body_of(error).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            "All models failed. Last error: timed out"
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) = body_of(AppError::Internal(anyhow::anyhow!("secret detail"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "An internal server error occurred");
    }

    #[tokio::test]
    async fn test_validation_and_conflict_statuses() {
        let (status, body) = body_of(AppError::Validation("No Key".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No Key");

        let (status, _) = body_of(AppError::Conflict("nothing yet".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
