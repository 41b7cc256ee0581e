//! Migrate command - creates the users table in PostgreSQL

use anyhow::Context;
use tracing::info;

use crate::infrastructure::user::PostgresCredentialStore;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    let url = config
        .database_url()
        .context("DATABASE_URL or APP__DATABASE__URL must be set to migrate")?;

    let store = PostgresCredentialStore::connect(
        &url,
        config.database.max_connections,
        config.database.connect_timeout(),
    )
    .await?;
    store.migrate().await?;

    info!("Migration complete");
    Ok(())
}
