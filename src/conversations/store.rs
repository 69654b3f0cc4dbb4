use sqlx::SqlitePool;

use crate::{
    appresult::{is_unique_violation, AppError, AppResult},
    db::new_id,
    models::{Conversation, User},
};

/// Participant-count rules, checked before anything touches the database.
/// The first failing rule decides the error.
pub fn validate_participants(user_ids: &[String], is_group: bool) -> AppResult<()> {
    match user_ids.len() {
        0 => Err(AppError::invalid("user_ids is required")),
        1 => Err(AppError::invalid("single-user conversation not allowed")),
        n if n > 2 && !is_group => Err(AppError::invalid("group conversation requires is_group=true")),
        _ => Ok(()),
    }
}

/// Creates the conversation and one membership per listed user in a single
/// transaction. Any failure, such as an unknown user, leaves nothing behind.
pub async fn create_conversation(
    db_pool: &SqlitePool,
    user_ids: &[String],
    is_group: bool,
    group_name: Option<&str>,
    group_photo: Option<&str>,
) -> AppResult<Conversation> {
    validate_participants(user_ids, is_group)?;

    let mut tx = db_pool.begin().await?;

    let conversation: Conversation = sqlx::query_as(
        r#"INSERT INTO conversations (conversation_id, is_group, group_name, group_photo)
        VALUES (?, ?, ?, ?)
        RETURNING
            conversation_id,
            is_group,
            COALESCE(group_name, '') AS group_name,
            COALESCE(group_photo, '') AS group_photo"#,
    )
    .bind(new_id())
    .bind(is_group)
    .bind(group_name)
    .bind(group_photo)
    .fetch_one(&mut *tx)
    .await?;

    for user_id in user_ids {
        if sqlx::query("SELECT 1 FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_none() {
            return Err(AppError::not_found(format!("user {user_id} does not exist")));
        }

        sqlx::query("INSERT INTO memberships (user_id, conversation_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(&conversation.conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::invalid(format!("user {user_id} listed more than once"))
                } else {
                    err.into()
                }
            })?;
    }

    tx.commit().await?;

    tracing::info!(
        conversation_id = %conversation.conversation_id,
        is_group,
        members = user_ids.len(),
        "created conversation"
    );
    Ok(conversation)
}

pub async fn list_conversations(db_pool: &SqlitePool) -> AppResult<Vec<Conversation>> {
    Ok(
        sqlx::query_as(
            r#"SELECT
                conversation_id,
                is_group,
                COALESCE(group_name, '') AS group_name,
                COALESCE(group_photo, '') AS group_photo
            FROM conversations"#,
        )
        .fetch_all(db_pool)
        .await?
    )
}

/// Empty when the user is in no conversation, or does not exist.
pub async fn list_conversations_by_member(db_pool: &SqlitePool, user_id: &str) -> AppResult<Vec<Conversation>> {
    Ok(
        sqlx::query_as(
            r#"SELECT
                c.conversation_id,
                c.is_group,
                COALESCE(c.group_name, '') AS group_name,
                COALESCE(c.group_photo, '') AS group_photo
            FROM conversations c
            JOIN memberships m ON c.conversation_id = m.conversation_id
            WHERE m.user_id = ?"#,
        )
        .bind(user_id)
        .fetch_all(db_pool)
        .await?
    )
}

/// The conversation itself is not looked up; an unknown id just has no members.
pub async fn list_members(db_pool: &SqlitePool, conversation_id: &str) -> AppResult<Vec<User>> {
    Ok(
        sqlx::query_as(
            r#"SELECT
                u.user_id,
                u.username,
                COALESCE(u.photo, '') AS photo
            FROM users u
            JOIN memberships m ON u.user_id = m.user_id
            WHERE m.conversation_id = ?"#,
        )
        .bind(conversation_id)
        .fetch_all(db_pool)
        .await?
    )
}
