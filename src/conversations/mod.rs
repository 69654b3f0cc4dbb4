pub mod store;

mod list;
mod new;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversation", post(new::new_conversation))
        .route("/conversations", get(list::list_conversations))
        .route("/conversation/{conversation_id}/members", get(list::list_members))
        .route("/user/{user_id}/conversations", get(list::list_by_member))
}
