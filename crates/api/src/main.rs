use std::sync::Arc;

use pvara_api::config::AppConfig;
use pvara_auth::{AuthService, InMemoryUserDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pvara_observability::init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let ctx = Arc::new(config.signing_context()?);
    let directory = Arc::new(InMemoryUserDirectory::from_seed(config.load_seed_users()?)?);

    let users = directory.count().await;
    if users == 0 {
        tracing::warn!("user directory is empty; every login will be rejected");
    } else {
        tracing::info!(users, "user directory seeded");
    }

    let auth = Arc::new(AuthService::new(ctx, directory));
    let app = pvara_api::app::build_app(auth);

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
