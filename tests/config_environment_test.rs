// ABOUTME: Unit tests for environment-driven server configuration
// ABOUTME: Validates defaults, overrides, parse errors, and secret-free summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serial_test::serial;
use somnia_server::config::environment::{AnalysisBackendKind, Environment, ServerConfig};
use somnia_server::constants::env_config;
use std::env;
use std::time::Duration;

const ALL_VARS: &[&str] = &[
    env_config::HTTP_PORT,
    env_config::DATABASE_URL,
    env_config::JWT_SECRET,
    env_config::JWT_EXPIRY_HOURS,
    env_config::ENVIRONMENT,
    env_config::CORS_ALLOWED_ORIGINS,
    env_config::STATS_TIMEOUT_SECS,
    env_config::ANALYSIS_BACKEND,
    env_config::ANALYSIS_BASE_URL,
    env_config::ANALYSIS_ENDPOINT_URL,
    env_config::OPENAI_API_KEY,
    env_config::ANALYSIS_MODEL,
    env_config::ANALYSIS_MAX_TOKENS,
    env_config::ANALYSIS_MIN_INTERVAL_SECS,
    env_config::ANALYSIS_MAX_ATTEMPTS,
    env_config::ANALYSIS_DEFAULT_RETRY_AFTER_SECS,
    env_config::ANALYSIS_REQUEST_TIMEOUT_SECS,
    env_config::THEME_LABEL,
];

fn reset_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_with_only_secret() {
    reset_env();
    env::set_var(env_config::JWT_SECRET, "super-secret-value");

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8081);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.database.url, "sqlite:./data/somnia.db");
    assert_eq!(config.auth.jwt_expiry_hours, 24);
    assert_eq!(config.cors.allowed_origins, "*");
    assert!(config.stats_timeout.is_none());
    assert_eq!(config.analysis.backend, AnalysisBackendKind::Chat);
    assert_eq!(config.analysis.model, "gpt-3.5-turbo");
    assert_eq!(config.analysis.max_tokens, 300);
    assert_eq!(config.analysis.min_interval, Duration::from_secs(20));
    assert_eq!(config.analysis.max_attempts, 5);
    assert_eq!(config.analysis.default_retry_after, Duration::from_secs(20));
    assert_eq!(config.analysis.theme_label, "Themes");

    reset_env();
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    reset_env();
    env::set_var(env_config::JWT_SECRET, "s");
    env::set_var(env_config::HTTP_PORT, "9000");
    env::set_var(env_config::ENVIRONMENT, "production");
    env::set_var(env_config::STATS_TIMEOUT_SECS, "90");
    env::set_var(env_config::ANALYSIS_BACKEND, "endpoint");
    env::set_var(env_config::ANALYSIS_ENDPOINT_URL, "http://localhost:5000/analyze");
    env::set_var(env_config::ANALYSIS_MIN_INTERVAL_SECS, "2");
    env::set_var(env_config::THEME_LABEL, "Motifs");

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 9000);
    assert!(config.environment.is_production());
    assert_eq!(config.stats_timeout, Some(Duration::from_secs(90)));
    assert_eq!(config.analysis.backend, AnalysisBackendKind::Endpoint);
    assert_eq!(
        config.analysis.endpoint_url.as_deref(),
        Some("http://localhost:5000/analyze")
    );
    assert_eq!(config.analysis.min_interval, Duration::from_secs(2));
    assert_eq!(config.analysis.theme_label, "Motifs");

    reset_env();
}

#[test]
#[serial]
fn test_missing_secret_is_an_error() {
    reset_env();
    assert!(ServerConfig::from_env().is_err());

    env::set_var(env_config::JWT_SECRET, "   ");
    assert!(ServerConfig::from_env().is_err());

    reset_env();
}

#[test]
#[serial]
fn test_invalid_numbers_are_errors() {
    reset_env();
    env::set_var(env_config::JWT_SECRET, "s");
    env::set_var(env_config::ANALYSIS_MAX_ATTEMPTS, "lots");

    let error = ServerConfig::from_env().unwrap_err();
    assert!(format!("{error:#}").contains(env_config::ANALYSIS_MAX_ATTEMPTS));

    env::set_var(env_config::ANALYSIS_MAX_ATTEMPTS, "0");
    assert!(ServerConfig::from_env().is_err());

    reset_env();
}

#[test]
#[serial]
fn test_endpoint_backend_requires_url() {
    reset_env();
    env::set_var(env_config::JWT_SECRET, "s");
    env::set_var(env_config::ANALYSIS_BACKEND, "endpoint");

    assert!(ServerConfig::from_env().is_err());

    env::set_var(env_config::ANALYSIS_BACKEND, "carrier-pigeon");
    assert!(ServerConfig::from_env().is_err());

    reset_env();
}

#[test]
#[serial]
fn test_summary_hides_secrets() {
    reset_env();
    env::set_var(env_config::JWT_SECRET, "jwt-secret-do-not-log");
    env::set_var(env_config::OPENAI_API_KEY, "sk-do-not-log");
    env::set_var(env_config::DATABASE_URL, "postgres://user:hunter2@db/somnia");

    let config = ServerConfig::from_env().unwrap();
    let summary = config.summary();
    let debug = format!("{config:?}");

    for secret in ["jwt-secret-do-not-log", "sk-do-not-log", "hunter2"] {
        assert!(!summary.contains(secret), "summary leaks {secret}");
    }
    assert!(!debug.contains("jwt-secret-do-not-log"));
    assert!(!debug.contains("sk-do-not-log"));

    reset_env();
}
