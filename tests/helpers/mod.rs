// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the in-process HTTP request builder for axum routers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
