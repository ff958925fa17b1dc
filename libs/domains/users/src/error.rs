use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with ID {0} not found.")]
    NotFound(Uuid),

    /// Login with an email nobody registered
    #[error("User not found")]
    UnknownEmail,

    #[error("Incorrect password or username")]
    InvalidCredentials,

    #[error("Missing address object")]
    MissingAddress,

    /// Registration with an email that is already taken
    #[error("Email already in use")]
    EmailRegistered,

    /// Update to an email owned by another user
    #[error("Email already in use")]
    DuplicateEmail,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::UnknownEmail => AppError::NotFound(err.to_string()),
            UserError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            UserError::MissingAddress | UserError::EmailRegistered => {
                AppError::BadRequest(err.to_string())
            }
            UserError::DuplicateEmail => AppError::Conflict(err.to_string()),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::Database(e) => AppError::Database(e),
            UserError::PasswordHash(msg) | UserError::Internal(msg) => {
                AppError::InternalServerError(msg)
            }
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_email_conflicts_differ_between_register_and_update() {
        assert_eq!(
            AppError::from(UserError::EmailRegistered).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(UserError::DuplicateEmail).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let id = Uuid::nil();
        assert_eq!(
            UserError::NotFound(id).to_string(),
            format!("User with ID {} not found.", id)
        );
    }
}
