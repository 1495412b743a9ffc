// ABOUTME: Main library entry point for the Somnia dream journal server
// ABOUTME: Wires the analysis pipeline, storage, auth, and HTTP routes into one crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Somnia Server
//!
//! A dream journal backend. Users record dream entries, request AI-generated theme
//! analysis, and read aggregate statistics (themes, mood, intensity) over time.
//!
//! ## Analysis pipeline
//!
//! Reading statistics enriches every stored dream with a theme list:
//!
//! - stored analysis text is parsed locally, without any network call
//! - otherwise the process-wide cache is consulted
//! - otherwise the shared rate limiter is acquired and the analysis provider is
//!   called with bounded retries on HTTP 429
//! - the answer is parsed, cached, and persisted; failures degrade to the
//!   `Analysis Pending` sentinel and are retried on the next read
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use somnia_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Somnia configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// AI analysis pipeline: parser, cache, rate limiter, client, and orchestration
pub mod analysis;

/// Bearer token issuance and validation
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants (re-exported from `somnia-core`)
pub mod constants;

/// Dream persistence (`DreamStore` trait and `SQLite` implementation)
pub mod database;

/// Unified error handling (re-exported from `somnia-core`)
pub mod errors;

/// OpenAI-compatible chat completion wire types and prompts
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (authentication, CORS)
pub mod middleware;

/// Core data models (re-exported from `somnia-core`)
pub mod models;

/// Shared server resources injected into route handlers
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and HTTP server lifecycle
pub mod server;

/// Aggregate dream statistics
pub mod stats;
