use axum::{debug_handler, extract::{Path, State}, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::AppResult;

use super::store;

#[debug_handler]
pub(crate) async fn delete_user(
    Path(user_id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Value>> {
    store::delete_user(&db_pool, &user_id).await?;
    Ok(Json(json!({ "deleted": user_id })))
}
