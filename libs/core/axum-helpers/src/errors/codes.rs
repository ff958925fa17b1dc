//! Machine readable error codes.
//!
//! Every error response carries one of these next to the human message so
//! clients can branch without string matching. The numeric code is only
//! logged.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::Conflict;
//! assert_eq!(code.as_str(), "CONFLICT");
//! assert_eq!(code.code(), 1008);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    ValidationError,
    InvalidUuid,
    InvalidJson,
    InvalidQuery,
    BadRequest,
    NotFound,
    Unauthorized,
    Forbidden,
    Conflict,
    UnprocessableEntity,
    // Server errors
    InternalError,
    ServiceUnavailable,
    // Database errors (2000-2999)
    DatabaseError,
    UniqueViolation,
    ForeignKeyViolation,
    DatabaseUnavailable,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidUuid => "INVALID_UUID",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::ForeignKeyViolation => "FOREIGN_KEY_VIOLATION",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
        }
    }

    /// Numeric code used in log fields.
    pub const fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::InvalidJson => 1003,
            Self::InvalidQuery => 1004,
            Self::BadRequest => 1005,
            Self::NotFound => 1006,
            Self::Unauthorized => 1007,
            Self::Conflict => 1008,
            Self::Forbidden => 1009,
            Self::UnprocessableEntity => 1010,
            Self::InternalError => 1500,
            Self::ServiceUnavailable => 1503,
            Self::DatabaseError => 2001,
            Self::UniqueViolation => 2002,
            Self::ForeignKeyViolation => 2003,
            Self::DatabaseUnavailable => 2004,
        }
    }

    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed.",
            Self::InvalidUuid => "Invalid UUID format.",
            Self::InvalidJson => "Invalid JSON body.",
            Self::InvalidQuery => "Invalid query parameters.",
            Self::BadRequest => "Bad request.",
            Self::NotFound => "The requested resource was not found.",
            Self::Unauthorized => "You are not permitted to perform this action.",
            Self::Forbidden => "Forbidden",
            Self::Conflict => "The resource already exists.",
            Self::UnprocessableEntity => "The request could not be processed.",
            Self::InternalError | Self::DatabaseError => "An unexpected error occurred.",
            Self::ServiceUnavailable | Self::DatabaseUnavailable => {
                "The service is temporarily unavailable."
            }
            Self::UniqueViolation => "A record with these values already exists.",
            Self::ForeignKeyViolation => "A referenced record does not exist.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::UniqueViolation).unwrap();
        assert_eq!(json, "\"UNIQUE_VIOLATION\"");
        assert_eq!(ErrorCode::UniqueViolation.as_str(), "UNIQUE_VIOLATION");
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(ErrorCode::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_codes_are_unique() {
        let all = [
            ErrorCode::ValidationError,
            ErrorCode::InvalidUuid,
            ErrorCode::InvalidJson,
            ErrorCode::InvalidQuery,
            ErrorCode::BadRequest,
            ErrorCode::NotFound,
            ErrorCode::Unauthorized,
            ErrorCode::Forbidden,
            ErrorCode::Conflict,
            ErrorCode::UnprocessableEntity,
            ErrorCode::InternalError,
            ErrorCode::ServiceUnavailable,
            ErrorCode::DatabaseError,
            ErrorCode::UniqueViolation,
            ErrorCode::ForeignKeyViolation,
            ErrorCode::DatabaseUnavailable,
        ];
        let codes: std::collections::HashSet<i32> = all.iter().map(ErrorCode::code).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_internal_errors_share_generic_message() {
        assert_eq!(
            ErrorCode::DatabaseError.default_message(),
            "An unexpected error occurred."
        );
        assert_eq!(
            ErrorCode::InternalError.default_message(),
            ErrorCode::DatabaseError.default_message()
        );
    }
}
