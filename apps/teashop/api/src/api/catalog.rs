use axum::Router;
use domain_catalog::{CatalogService, PgCatalogRepository, handlers};

use crate::state::AppState;

fn service(state: &AppState) -> CatalogService<PgCatalogRepository> {
    CatalogService::new(PgCatalogRepository::new(state.db.clone()))
}

pub fn product_router(state: &AppState) -> Router {
    handlers::product_router(service(state))
}

pub fn category_router(state: &AppState) -> Router {
    handlers::category_router(service(state))
}
