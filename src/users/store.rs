use sqlx::SqlitePool;

use crate::{
    appresult::{is_unique_violation, AppError, AppResult},
    db::new_id,
    models::User,
};

const USER_COLUMNS: &str = "user_id, username, COALESCE(photo, '') AS photo";

pub async fn create_user(db_pool: &SqlitePool, username: &str) -> AppResult<User> {
    let inserted = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (user_id, username) VALUES (?, ?) RETURNING {USER_COLUMNS}"
    ))
    .bind(new_id())
    .bind(username)
    .fetch_one(db_pool)
    .await;

    match inserted {
        Ok(user) => {
            tracing::info!(user_id = %user.user_id, "created user @{username}");
            Ok(user)
        }
        Err(err) if is_unique_violation(&err) => {
            Err(AppError::conflict(format!("username {username:?} already exists")))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn get_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"))
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user {user_id} does not exist")))
}

pub async fn list_users(db_pool: &SqlitePool) -> AppResult<Vec<User>> {
    Ok(
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users"))
            .fetch_all(db_pool)
            .await?
    )
}

/// Unknown user and a name held by someone else are told apart: the first is
/// `NotFound`, the second `Conflict`. Keeping one's own name is allowed.
///
/// The guarded update runs first so a concurrent writer only ever waits on the
/// write lock; the follow-up lookup is needed only to explain a miss.
pub async fn rename_user(db_pool: &SqlitePool, user_id: &str, new_username: &str) -> AppResult<User> {
    let conflict = || AppError::conflict(format!("username {new_username:?} already exists"));

    let updated = sqlx::query_as::<_, User>(&format!(
        r#"UPDATE users SET username = ?
        WHERE user_id = ?
        AND NOT EXISTS (SELECT 1 FROM users WHERE username = ? AND user_id != ?)
        RETURNING {USER_COLUMNS}"#
    ))
    .bind(new_username)
    .bind(user_id)
    .bind(new_username)
    .bind(user_id)
    .fetch_optional(db_pool)
    .await
    .map_err(|err| if is_unique_violation(&err) { conflict() } else { err.into() })?;

    if let Some(user) = updated {
        tracing::info!(%user_id, "renamed user to @{new_username}");
        return Ok(user);
    }

    if sqlx::query("SELECT 1 FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?
        .is_none() {
        return Err(AppError::not_found(format!("user {user_id} does not exist")));
    }

    Err(conflict())
}

/// Memberships go with the user through the cascading foreign key.
pub async fn delete_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
        .bind(user_id)
        .execute(db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("user {user_id} does not exist")));
    }

    tracing::info!(%user_id, "deleted user");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn create_then_duplicate_conflicts() {
        let db_pool = test_pool().await;

        let user = create_user(&db_pool, "ada").await.unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(user.photo, "");
        assert_eq!(user.user_id.len(), 32);

        let err = create_user(&db_pool, "ada").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn get_unknown_user_is_not_found() {
        let db_pool = test_pool().await;
        let err = get_user(&db_pool, "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn get_returns_created_user() {
        let db_pool = test_pool().await;
        let created = create_user(&db_pool, "grace").await.unwrap();
        assert_eq!(get_user(&db_pool, &created.user_id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn list_returns_everyone() {
        let db_pool = test_pool().await;
        assert!(list_users(&db_pool).await.unwrap().is_empty());

        create_user(&db_pool, "a").await.unwrap();
        create_user(&db_pool, "b").await.unwrap();

        let mut names: Vec<String> = list_users(&db_pool)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        names.sort();
        assert_eq!(names, ["a", "b"]);
    }

    #[tokio::test]
    async fn rename_updates_username() {
        let db_pool = test_pool().await;
        let user = create_user(&db_pool, "old").await.unwrap();

        let renamed = rename_user(&db_pool, &user.user_id, "new").await.unwrap();
        assert_eq!(renamed.user_id, user.user_id);
        assert_eq!(renamed.username, "new");
        assert_eq!(get_user(&db_pool, &user.user_id).await.unwrap().username, "new");
    }

    #[tokio::test]
    async fn rename_to_own_name_succeeds() {
        let db_pool = test_pool().await;
        let user = create_user(&db_pool, "same").await.unwrap();
        assert_eq!(rename_user(&db_pool, &user.user_id, "same").await.unwrap(), user);
    }

    #[tokio::test]
    async fn rename_to_taken_name_conflicts() {
        let db_pool = test_pool().await;
        create_user(&db_pool, "taken").await.unwrap();
        let user = create_user(&db_pool, "free").await.unwrap();

        let err = rename_user(&db_pool, &user.user_id, "taken").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
        assert_eq!(get_user(&db_pool, &user.user_id).await.unwrap().username, "free");
    }

    #[tokio::test]
    async fn rename_unknown_user_is_not_found() {
        let db_pool = test_pool().await;
        create_user(&db_pool, "taken").await.unwrap();

        // not found wins even when the name is also taken
        let err = rename_user(&db_pool, "ghost", "taken").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    }

    #[tokio::test]
    async fn delete_removes_user_once() {
        let db_pool = test_pool().await;
        let user = create_user(&db_pool, "bye").await.unwrap();

        delete_user(&db_pool, &user.user_id).await.unwrap();
        assert!(matches!(get_user(&db_pool, &user.user_id).await, Err(AppError::NotFound(_))));

        let err = delete_user(&db_pool, &user.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    }
}
