// ABOUTME: Route module organization for the dream journal HTTP endpoints
// ABOUTME: Each domain module holds route definitions and thin handlers over the services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Dream statistics and submission routes
pub mod dreams;
/// Health check and readiness routes
pub mod health;

/// Dream route handlers
pub use dreams::DreamRoutes;
/// Health route handlers
pub use health::HealthRoutes;
