use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;

#[debug_handler]
pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello World!" }))
}

/// 503 when the pool cannot hand out a connection.
#[debug_handler]
pub async fn liveness(State(db_pool): State<SqlitePool>) -> (StatusCode, Json<Value>) {
    match db_pool.acquire().await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            tracing::warn!("liveness: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "unavailable" })))
        }
    }
}
