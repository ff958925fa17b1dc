//! Shared state handed to the route builders and the readiness check.

use axum_helpers::SessionAuth;

/// Cloned into every router builder; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Issues and verifies session tokens, shared with the session middleware
    pub auth: SessionAuth,
}
