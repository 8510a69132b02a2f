// ABOUTME: Saedam API server binary with serve and migrate subcommands
// ABOUTME: Loads configuration, connects to the database with retries, and starts the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Saedam Contributors

//! # Saedam API Server Binary
//!
//! `saedam-server migrate` applies pending schema migrations and exits; it
//! needs database settings only, not provider credentials.
//! `saedam-server serve` (the default) starts the HTTP API; it only migrates
//! first when `AUTO_MIGRATE=true`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use saedam_server::{
    config::ServerConfig,
    database::{ChatStore, Database},
    llm::{LlmProvider, OpenAiProvider},
    logging,
    resources::ServerResources,
    server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "saedam-server")]
#[command(about = "Saedam API - companion chat backend with affection progression")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API (default)
    Serve {
        /// Override HTTP port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let command = args.command.unwrap_or(Command::Serve { port: None });

    let mut config = ServerConfig::from_env()?;
    if let Command::Serve { port: Some(port) } = command {
        config.http_port = port;
    }
    config.validate()?;
    if matches!(command, Command::Serve { .. }) {
        config.llm.validate()?;
    }

    info!("{}", config.summary());

    let database = Database::connect_with_retry(&config.database)
        .await
        .context("Database unavailable")?;

    match command {
        Command::Migrate => {
            database.migrate().await?;
            info!("Migrations applied");
            Ok(())
        }
        Command::Serve { .. } => {
            if config.database.auto_migrate {
                database.migrate().await?;
                info!("Migrations applied at startup");
            }
            run_server(database, config).await
        }
    }
}

async fn run_server(database: Database, config: ServerConfig) -> Result<()> {
    let llm = OpenAiProvider::new(&config.llm)?;
    info!(
        provider = llm.name(),
        model = llm.default_model(),
        "Model provider ready"
    );

    let store: Arc<dyn ChatStore> = Arc::new(database);
    let llm: Arc<dyn LlmProvider> = Arc::new(llm);
    let resources = Arc::new(ServerResources::new(store, llm, Arc::new(config)));

    if let Err(e) = server::serve(resources).await {
        error!("Server error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
