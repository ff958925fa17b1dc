use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Product not found.")]
    ProductNotFound,

    /// Update of a product that does not exist
    #[error("Product with id {0} not found.")]
    ProductMissing(Uuid),

    #[error("Product name and price are required.")]
    MissingNameOrPrice,

    #[error("One or more categories do not exist.")]
    UnknownCategory,

    #[error("Category not found.")]
    CategoryNotFound,

    #[error("Category '{0}' already exists.")]
    DuplicateCategory(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound
            | CatalogError::ProductMissing(_)
            | CatalogError::CategoryNotFound => AppError::NotFound(err.to_string()),
            CatalogError::MissingNameOrPrice | CatalogError::UnknownCategory => {
                AppError::BadRequest(err.to_string())
            }
            CatalogError::DuplicateCategory(_) => AppError::Conflict(err.to_string()),
            CatalogError::Validation(msg) => AppError::BadRequest(msg),
            CatalogError::Database(e) => AppError::Database(e),
            CatalogError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
