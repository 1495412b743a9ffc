// ABOUTME: Somnia server binary: loads configuration and serves the dream journal API
// ABOUTME: Initializes logging, opens the database, and runs until Ctrl+C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Somnia Server Binary
//!
//! Starts the HTTP API with bearer authentication, `SQLite` storage, and the
//! throttled AI analysis pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use somnia_server::{
    config::environment::ServerConfig, database::Database, logging::LoggingConfig,
    resources::ServerResources, server,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "somnia-server")]
#[command(about = "Somnia - dream journal API with AI theme analysis")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    LoggingConfig::from_env().init()?;

    info!("Starting Somnia dream journal server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    info!("Database initialized successfully");

    let port = config.http_port;
    let resources = Arc::new(
        ServerResources::new(config, Arc::new(database))
            .context("Failed to build server resources")?,
    );
    info!("Analysis backend ready: {}", resources.analysis.client().backend_name());

    if let Err(e) = server::serve(resources, port).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}
