use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;

use crate::{models::User, AppResult};

use super::store;

#[debug_handler]
pub(crate) async fn list_users(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(store::list_users(&db_pool).await?))
}

#[debug_handler]
pub(crate) async fn get_user(
    Path(user_id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<User>> {
    Ok(Json(store::get_user(&db_pool, &user_id).await?))
}
