use axum::{debug_handler, extract::{rejection::JsonRejection, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{models::Conversation, AppError, AppResult};

use super::store;

#[derive(Debug, Deserialize)]
pub(crate) struct NewConversationBody {
    #[serde(default)]
    user_ids: Vec<String>,
    #[serde(default)]
    is_group: bool,
    group_name: Option<String>,
    group_photo: Option<String>,
}

#[debug_handler]
pub(crate) async fn new_conversation(
    State(db_pool): State<SqlitePool>,
    body: Result<Json<NewConversationBody>, JsonRejection>,
) -> AppResult<Json<Conversation>> {
    let Json(NewConversationBody { user_ids, is_group, group_name, group_photo }) =
        body.map_err(|rejection| AppError::invalid(format!("invalid request body: {}", rejection.body_text())))?;

    let conversation = store::create_conversation(
        &db_pool,
        &user_ids,
        is_group,
        group_name.as_deref(),
        group_photo.as_deref(),
    )
    .await?;

    Ok(Json(conversation))
}
