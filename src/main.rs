use clap::Parser;
use tracing_subscriber::EnvFilter;

use project_files_api::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL and the OAuth credentials are picked up
    let _ = dotenvy::dotenv();

    let default_filter = if project_files_api::is_development!() {
        "info,tower_http=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    cli::run(Cli::parse()).await
}
