use axum::Router;
use domain_messages::{MessageService, PgMessageRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let service = MessageService::new(PgMessageRepository::new(state.db.clone()));
    handlers::router(service)
}
