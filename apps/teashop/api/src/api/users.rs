use axum::Router;
use domain_users::{PgUserRepository, UserService, auth_handlers, handlers};

use crate::state::AppState;

/// `/login`, `/register`, `/sessionUser`, `/logout`
pub fn auth_router(state: &AppState) -> Router {
    let service = UserService::new(PgUserRepository::new(state.db.clone()));
    auth_handlers::router(service, state.auth.clone())
}

pub fn router(state: &AppState) -> Router {
    let service = UserService::new(PgUserRepository::new(state.db.clone()));
    handlers::router(service)
}
