use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use uuid::Uuid;

pub const USERS_TABLE: &str = "users";
pub const CONVERSATIONS_TABLE: &str = "conversations";
pub const MEMBERSHIPS_TABLE: &str = "memberships";

const USERS_DDL: &str = r#"
    CREATE TABLE users (
        user_id  TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
        username TEXT NOT NULL UNIQUE,
        photo    TEXT
    )"#;

const CONVERSATIONS_DDL: &str = r#"
    CREATE TABLE conversations (
        conversation_id TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
        is_group        BOOLEAN NOT NULL CHECK (is_group IN (0, 1)),
        group_name      TEXT,
        group_photo     TEXT
    )"#;

const MEMBERSHIPS_DDL: &str = r#"
    CREATE TABLE memberships (
        user_id         TEXT NOT NULL,
        conversation_id TEXT NOT NULL,
        PRIMARY KEY (user_id, conversation_id),
        FOREIGN KEY (user_id) REFERENCES users(user_id) ON DELETE CASCADE,
        FOREIGN KEY (conversation_id) REFERENCES conversations(conversation_id) ON DELETE CASCADE
    )"#;

/// Parents before children, so the foreign keys resolve.
const TABLES: [(&str, &str); 3] = [
    (USERS_TABLE, USERS_DDL),
    (CONVERSATIONS_TABLE, CONVERSATIONS_DDL),
    (MEMBERSHIPS_TABLE, MEMBERSHIPS_DDL),
];

/// Opens a pool with foreign keys enforced on every connection. The database
/// file is created if it is missing.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("parse database url {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("connect to sqlite via {database_url}"))
}

/// Makes sure every table exists. Never drops or alters anything, so it is
/// safe to run on each start.
pub async fn init_schema(db_pool: &SqlitePool) -> anyhow::Result<()> {
    for (table, ddl) in TABLES {
        ensure_table_exists(db_pool, table, ddl).await?;
    }
    Ok(())
}

async fn table_exists(db_pool: &SqlitePool, table: &str) -> anyhow::Result<bool> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
            .bind(table)
            .fetch_optional(db_pool)
            .await
            .with_context(|| format!("check for table {table}"))?;
    Ok(existing.is_some())
}

#[tracing::instrument(skip(db_pool, ddl))]
async fn ensure_table_exists(db_pool: &SqlitePool, table: &str, ddl: &str) -> anyhow::Result<()> {
    if table_exists(db_pool, table).await? {
        tracing::debug!("table already present");
        return Ok(());
    }

    tracing::info!("creating table");
    if let Err(err) = sqlx::query(ddl).execute(db_pool).await {
        // another process may have won the race
        if table_exists(db_pool, table).await? {
            return Ok(());
        }
        return Err(err).with_context(|| format!("create table {table}"));
    }
    Ok(())
}

/// 32 lowercase hex digits, the same shape as the schema default.
pub fn new_id() -> String {
    Uuid::now_v7().simple().to_string()
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // one connection, kept forever: every in-memory connection is its own database
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    init_schema(&db_pool).await.unwrap();
    db_pool
}
