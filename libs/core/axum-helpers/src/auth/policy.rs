//! Route policies expressed as extractors.
//!
//! They read the claims that [`super::session_middleware`] stored in the
//! request extensions.

use super::session::SessionClaims;
use crate::errors::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub const NOT_PERMITTED: &str = "You are not permitted to perform this action.";

/// Any logged in user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionClaims);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.user_id()
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin()
    }

    /// Passes for administrators and for the user `owner_id` itself.
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.id() == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden("Forbidden".to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized(NOT_PERMITTED.to_string()))
    }
}

/// Logged in administrator. Non-admins get a 401 like anonymous callers.
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionClaims);

impl AdminUser {
    pub fn id(&self) -> Uuid {
        self.0.user_id()
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(claims) = CurrentUser::from_request_parts(parts, state).await?;
        if claims.is_admin() {
            Ok(AdminUser(claims))
        } else {
            tracing::info!(user_id = %claims.sub, "Admin route refused");
            Err(AppError::Unauthorized(NOT_PERMITTED.to_string()))
        }
    }
}

/// Session if there is one.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<SessionClaims>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<SessionClaims>().cloned()))
    }
}
