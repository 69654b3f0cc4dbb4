use alchats::{db, users::store};
use anyhow::Result;
use tempfile::TempDir;

async fn file_pool(td: &TempDir) -> Result<sqlx::SqlitePool> {
    let url = format!("sqlite://{}", td.path().join("alchats.db").display());
    let db_pool = db::connect(&url, 8).await?;
    db::init_schema(&db_pool).await?;
    Ok(db_pool)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_renames_of_different_users_all_succeed() -> Result<()> {
    let td = TempDir::new()?;
    let db_pool = file_pool(&td).await?;

    let mut user_ids = Vec::new();
    for i in 0..32 {
        user_ids.push(store::create_user(&db_pool, &format!("user{i}")).await?.user_id);
    }

    let tasks: Vec<_> = user_ids
        .iter()
        .enumerate()
        .map(|(i, user_id)| {
            let db_pool = db_pool.clone();
            let user_id = user_id.clone();
            tokio::spawn(async move { store::rename_user(&db_pool, &user_id, &format!("renamed{i}")).await })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let renamed = task.await?;
        let user = renamed.unwrap_or_else(|err| panic!("rename {i} failed: {err:?}"));
        assert_eq!(user.username, format!("renamed{i}"));
    }

    let mut names: Vec<String> = store::list_users(&db_pool)
        .await?
        .into_iter()
        .map(|u| u.username)
        .collect();
    names.sort();
    let mut expected: Vec<String> = (0..32).map(|i| format!("renamed{i}")).collect();
    expected.sort();
    assert_eq!(names, expected);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_renames_to_one_name_pick_a_single_winner() -> Result<()> {
    let td = TempDir::new()?;
    let db_pool = file_pool(&td).await?;

    let mut user_ids = Vec::new();
    for i in 0..8 {
        user_ids.push(store::create_user(&db_pool, &format!("contender{i}")).await?.user_id);
    }

    let tasks: Vec<_> = user_ids
        .into_iter()
        .map(|user_id| {
            let db_pool = db_pool.clone();
            tokio::spawn(async move { store::rename_user(&db_pool, &user_id, "champion").await })
        })
        .collect();

    let mut winners = 0;
    for task in tasks {
        match task.await? {
            Ok(_) => winners += 1,
            Err(alchats::AppError::Conflict(_)) => {}
            Err(err) => panic!("unexpected error: {err:?}"),
        }
    }
    assert_eq!(winners, 1);
    Ok(())
}
