use axum_helpers::{
    SessionAuth,
    server::{create_production_app, health_router},
};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_catalog::{CatalogService, PgCatalogRepository};
use domain_users::{PgUserRepository, UserService};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod bootstrap;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before anything fallible, so startup errors are rendered with color-eyre
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Database migration failed: {}", e))?;

    bootstrap::run(
        &CatalogService::new(PgCatalogRepository::new(db.clone())),
        &UserService::new(PgUserRepository::new(db.clone())),
        config.admin.as_ref(),
    )
    .await?;

    let auth = SessionAuth::new(&config.session);
    let server = config.server.clone();
    let state = AppState { config, db, auth };

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.cors)?;

    // /health: liveness with name and version; /ready: database ping
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()));

    info!("Starting teashop API (30s shutdown timeout)");

    create_production_app(
        app,
        &server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match state.db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Teashop API shutdown complete");
    Ok(())
}
