// ABOUTME: Re-exports dream data models from somnia-core
// ABOUTME: Keeps crate::models paths stable across the server crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

pub use somnia_core::models::*;
