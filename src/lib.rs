pub mod appresult;
pub mod config;
pub mod conversations;
pub mod db;
pub mod index;
pub mod models;
pub mod users;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// The full HTTP surface. The schema must already be initialized.
pub fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index::hello))
        .route("/liveness", get(index::liveness))

        .merge(users::router())
        .merge(conversations::router())

        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
