// ABOUTME: Somnia CLI - operator tool for token issuance and schema setup
// ABOUTME: Mints bearer tokens with the configured secret and runs database migrations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
//!
//! Usage:
//! ```bash
//! # Mint a bearer token for a user (uses JWT_SECRET / JWT_EXPIRY_HOURS)
//! somnia-cli token --user-id alice
//!
//! # Mint a short-lived token
//! somnia-cli token --user-id alice --expires-hours 1
//!
//! # Create the dreams schema
//! somnia-cli migrate --database-url sqlite:./data/somnia.db
//! ```

mod commands;

use clap::{Parser, Subcommand};
use somnia_server::errors::AppResult;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "somnia-cli",
    about = "Somnia Server Management CLI",
    long_about = "Command-line tool for issuing bearer tokens and preparing the Somnia database."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Mint a bearer token for a user id
    Token {
        /// Subject of the token
        #[arg(long)]
        user_id: String,

        /// Lifetime in hours (defaults to JWT_EXPIRY_HOURS)
        #[arg(long)]
        expires_hours: Option<i64>,
    },

    /// Create the database schema
    Migrate,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    info!("Somnia CLI");

    match cli.command {
        Command::Token {
            user_id,
            expires_hours,
        } => commands::token(&user_id, expires_hours),
        Command::Migrate => commands::migrate(cli.database_url).await,
    }
}
