use axum::{debug_handler, extract::{Path, State}, Json};
use sqlx::SqlitePool;

use crate::{models::{Conversation, User}, AppResult};

use super::store;

#[debug_handler]
pub(crate) async fn list_conversations(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<Conversation>>> {
    Ok(Json(store::list_conversations(&db_pool).await?))
}

#[debug_handler]
pub(crate) async fn list_by_member(
    Path(user_id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<Conversation>>> {
    Ok(Json(store::list_conversations_by_member(&db_pool, &user_id).await?))
}

#[debug_handler]
pub(crate) async fn list_members(
    Path(conversation_id): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(store::list_members(&db_pool, &conversation_id).await?))
}
