use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{models::User, AppResult};

use super::{required_param, store};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenameQuery {
    user_id: Option<String>,
    new_username: Option<String>,
}

#[debug_handler]
pub(crate) async fn rename_user(
    Query(RenameQuery { user_id, new_username }): Query<RenameQuery>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<User>> {
    let user_id = required_param(user_id, "userId")?;
    let new_username = required_param(new_username, "newUsername")?;

    Ok(Json(store::rename_user(&db_pool, &user_id, &new_username).await?))
}
