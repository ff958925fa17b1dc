use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("No user in session")]
    NoSessionUser,

    #[error("Invalid request data. Please provide all required fields.")]
    InvalidRequest,

    #[error("Invalid product data. Each product must have a valid ID and quantity > 0.")]
    InvalidProducts,

    #[error("One or more products do not exist or are not available anymore.")]
    UnavailableProducts,

    #[error("The total amount does not match the sum of the products and quantities.")]
    TotalMismatch,

    #[error("No user found.")]
    UserNotFound,

    #[error("The specified payment method does not exist or does not belong to the user.")]
    PaymentNotOwned,

    #[error("No shipping address available.")]
    NoShippingAddress,

    #[error("Order not found.")]
    NotFound,

    #[error("You can only cancel your own orders.")]
    NotOwner,

    #[error("Order cannot be canceled. Only \"open\" or \"processing\" orders can be canceled.")]
    NotCancelable,

    #[error("OrderStatus is required.")]
    StatusRequired,

    #[error("Order or shipping not found.")]
    ShippingNotFound,

    #[error("Order or shipping address not found.")]
    AddressNotFound,

    #[error("Invalid payment option provided.")]
    InvalidPaymentOption,

    #[error("Order or payment not found.")]
    PaymentNotFound,

    #[error("Failed to update payment information.")]
    PaymentUpdateFailed,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::UserNotFound
            | OrderError::NotFound
            | OrderError::ShippingNotFound
            | OrderError::AddressNotFound
            | OrderError::PaymentNotFound => AppError::NotFound(err.to_string()),
            OrderError::PaymentUpdateFailed => AppError::Conflict(err.to_string()),
            OrderError::Validation(msg) => AppError::BadRequest(msg),
            OrderError::Database(e) => AppError::Database(e),
            OrderError::Internal(msg) => AppError::InternalServerError(msg),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
