use axum::extract::State;
use diesel::connection::SimpleConnection;
use std::sync::Arc;

use pillory_shared::types::api::{HealthCheck, HealthResponse, HealthStatus};

use crate::{AppState, SERVICE_NAME};

/// Liveness plus a database round trip.
pub async fn health_check(State(state): State<Arc<AppState>>) -> HealthResponse {
    let database = match state.db.get() {
        Ok(mut conn) => match conn.batch_execute("SELECT 1") {
            Ok(()) => HealthCheck {
                name: "database".into(),
                status: HealthStatus::Healthy,
                message: None,
            },
            Err(e) => HealthCheck {
                name: "database".into(),
                status: HealthStatus::Unhealthy,
                message: Some(e.to_string()),
            },
        },
        Err(e) => HealthCheck {
            name: "database".into(),
            status: HealthStatus::Unhealthy,
            message: Some(e.to_string()),
        },
    };

    HealthResponse::healthy(SERVICE_NAME, env!("CARGO_PKG_VERSION")).with_checks(vec![database])
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
