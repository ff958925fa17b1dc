use axum::{Router, middleware, routing::get};
use axum_helpers::session_middleware;

use crate::state::AppState;

pub mod catalog;
pub mod health;
pub mod messages;
pub mod orders;
pub mod payments;
pub mod users;

/// API routes without the `/api` prefix, which `create_router` adds.
///
/// Every route sees the session middleware; the policy extractors in the
/// handlers decide what needs a session.
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(users::auth_router(state))
        .nest("/user", users::router(state))
        .nest("/product", catalog::product_router(state))
        .nest("/category", catalog::category_router(state))
        .nest("/order", orders::router(state))
        .nest("/payment", payments::router(state))
        .nest("/message", messages::router(state))
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            session_middleware,
        ))
}

/// `/ready` with a database ping, merged next to the stateless app router.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
