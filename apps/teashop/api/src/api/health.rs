use axum::{extract::State, response::Response};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

use crate::state::AppState;

/// Readiness: the database must answer.
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            let status = database::postgres::check_health_detailed(&state.db).await;
            tracing::debug!(
                response_time_ms = status.response_time_ms,
                healthy = status.healthy,
                "Database readiness check"
            );

            if status.healthy {
                Ok(())
            } else {
                Err(status
                    .message
                    .unwrap_or_else(|| "Database unavailable".to_string()))
            }
        }),
    )];

    run_health_checks(checks).await
}
