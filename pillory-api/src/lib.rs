use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod extractors;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

use config::AppConfig;
use pillory_shared::clients::db::DbPool;
use pillory_shared::clients::minotar::MinotarClient;
use pillory_shared::middleware::TokenSecret;

pub const SERVICE_NAME: &str = "pillory-api";

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub minotar: MinotarClient,
    pub metrics_handle: PrometheusHandle,
}

impl TokenSecret for AppState {
    fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .route("/change-password", post(routes::auth::change_password))
        .route("/register", post(routes::auth::register));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .route(
            "/players",
            get(routes::players::list_players).post(routes::players::add_player),
        )
        .route(
            "/players/:id",
            get(routes::players::get_player)
                .put(routes::players::update_player)
                .delete(routes::players::delete_player),
        )
        .route("/avatars/:nickname", get(routes::avatars::get_avatar));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(
            pillory_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
