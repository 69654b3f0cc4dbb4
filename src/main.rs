use alchats::{app, config::Config, db, AppState};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env().context("read configuration")?;
    tracing::info!(database_url = %config.database_url, "opening database");

    let db_pool = db::connect(&config.database_url, config.max_connections).await?;
    db::init_schema(&db_pool).await.context("initialize schema")?;

    let app = app(AppState { db_pool: db_pool.clone() });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;

    db_pool.close().await;
    tracing::info!("bye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
}
