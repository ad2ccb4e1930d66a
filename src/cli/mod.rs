pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "project-files-api")]
#[command(about = "REST backend for users, projects and project files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT/API_PORT")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle().await,
    }
}
