use anyhow::Context;

use crate::config;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let config = config::config();
    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    let result = db.migrate().await.context("failed to apply migrations");
    db.close().await;
    result
}
