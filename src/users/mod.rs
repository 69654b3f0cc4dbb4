pub mod store;

mod delete;
mod list;
mod rename;
mod session;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/session", post(session::create_user))
        .route("/users", get(list::list_users))
        .route("/user", post(rename::rename_user))
        .route("/user/{user_id}", get(list::get_user).delete(delete::delete_user))
}

/// Missing and empty query parameters are treated alike.
pub(crate) fn required_param(value: Option<String>, name: &str) -> crate::AppResult<String> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| crate::AppError::invalid(format!("{name} parameter is required")))
}
