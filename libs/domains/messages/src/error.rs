use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Message not found.")]
    NotFound,

    #[error("Name is required.")]
    NameRequired,

    #[error("Email is required.")]
    EmailRequired,

    #[error("Subject is required.")]
    SubjectRequired,

    #[error("Message is required.")]
    MessageRequired,

    #[error("Privacy agreement is required.")]
    PrivacyRequired,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type MessageResult<T> = Result<T, MessageError>;

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::NotFound => AppError::NotFound(err.to_string()),
            MessageError::Validation(errors) => AppError::ValidationError(errors),
            MessageError::Database(e) => AppError::Database(e),
            MessageError::Internal(msg) => AppError::InternalServerError(msg),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for MessageError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
