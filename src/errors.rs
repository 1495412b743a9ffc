// ABOUTME: Re-exports the unified error system from somnia-core
// ABOUTME: Keeps crate::errors paths stable for handlers, services, and binaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! The error types live in `somnia-core` so the foundation crate and the server share
//! one definition. Conversion into HTTP responses is enabled through the core crate's
//! `http-response` feature; `sqlx` errors convert through `database-errors`.

pub use somnia_core::errors::*;
