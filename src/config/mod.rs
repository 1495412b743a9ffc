// ABOUTME: Configuration management module for the dream server
// ABOUTME: Exposes environment-driven server, auth, and analysis settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Configuration module
//!
//! All settings come from environment variables; see [`environment::ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;
