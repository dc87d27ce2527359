use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lingodocs_shared::api::{Envelope, FieldErrors};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Document not found")]
    NotFound,

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                "Document not found".to_string(),
                None,
            ),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed".to_string(),
                Some(errors),
            ),
            AppError::Multipart(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Malformed form data: {}", e),
                None,
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                    None,
                )
            }
        };

        let body = Json(Envelope::<serde_json::Value>::error(
            status.as_u16(),
            message,
            errors,
        ));

        (status, body).into_response()
    }
}
