// ABOUTME: Core types and constants for the Somnia dream journal server
// ABOUTME: Foundation crate with error handling, dream models, and pipeline constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Somnia Core
//!
//! Foundation crate providing shared types and constants for the Somnia dream
//! journal server. It changes rarely, so the server crate can rebuild without
//! recompiling it.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Pipeline defaults (throttle interval, retry budget, sentinel labels)
//! - **models**: Dream records, theme lists, and the enriched response shape

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`DreamRecord`, `ThemeList`, `EnrichedDream`)
pub mod models;
