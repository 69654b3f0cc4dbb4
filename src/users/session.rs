use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{models::User, AppResult};

use super::{required_param, store};

#[derive(Deserialize)]
pub(crate) struct SessionQuery {
    username: Option<String>,
}

#[debug_handler]
pub(crate) async fn create_user(
    Query(SessionQuery { username }): Query<SessionQuery>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<User>> {
    let username = required_param(username, "username")?;
    Ok(Json(store::create_user(&db_pool, &username).await?))
}
