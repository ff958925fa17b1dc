use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment not found.")]
    NotFound,

    #[error("Not allowed to add payment for this user.")]
    CreateForbidden,

    #[error("Not allowed to find payment for this user.")]
    ListForbidden,

    #[error("Not allowed to update this payment.")]
    UpdateForbidden,

    #[error("Not allowed to delete this payment.")]
    DeleteForbidden,

    #[error("Payment option and user ID are required.")]
    MissingOption,

    #[error("IBAN is required for bank transfers.")]
    MissingIban,

    #[error("Credit card details (number, expiry date, and CVC) are required.")]
    MissingCardDetails,

    #[error("PayPal email is required for PayPal payments.")]
    MissingPaypalEmail,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotFound => AppError::NotFound(err.to_string()),
            PaymentError::CreateForbidden
            | PaymentError::ListForbidden
            | PaymentError::UpdateForbidden
            | PaymentError::DeleteForbidden => AppError::Forbidden(err.to_string()),
            PaymentError::MissingOption
            | PaymentError::MissingIban
            | PaymentError::MissingCardDetails
            | PaymentError::MissingPaypalEmail => AppError::BadRequest(err.to_string()),
            PaymentError::Validation(msg) => AppError::BadRequest(msg),
            PaymentError::Database(e) => AppError::Database(e),
            PaymentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
