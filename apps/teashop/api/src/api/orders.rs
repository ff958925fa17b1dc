use axum::Router;
use domain_orders::{OrderService, PgOrderRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let service = OrderService::new(PgOrderRepository::new(state.db.clone()));
    handlers::router(service)
}
