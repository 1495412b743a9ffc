// ABOUTME: Wire-level tests for the HTTP analysis backends against a local mock provider
// ABOUTME: Checks request shape, 429 retry-after handling, and error status mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use common::init_test_logging;
use serde_json::{json, Value};
use somnia_server::analysis::{
    AnalysisBackend, AnalysisClient, AttemptOutcome, ChatCompletionBackend, EndpointBackend,
    RetryPolicy,
};
use somnia_server::errors::ErrorCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Mock provider state: how many leading calls answer 429, plus captured requests
#[derive(Default)]
struct MockProvider {
    rate_limited_calls: usize,
    fail_status: Option<u16>,
    calls: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
    auth_headers: Mutex<Vec<Option<String>>>,
}

impl MockProvider {
    fn record(&self, headers: &HeaderMap, body: Value) -> Option<Response> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push(body);
        self.auth_headers.lock().unwrap().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned),
        );

        if index < self.rate_limited_calls {
            return Some(
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("retry-after", "0")],
                    Json(json!({"error": {"message": "slow down"}})),
                )
                    .into_response(),
            );
        }
        self.fail_status.map(|status| {
            (
                StatusCode::from_u16(status).unwrap(),
                Json(json!({"error": {"message": "provider exploded", "type": "server_error"}})),
            )
                .into_response()
        })
    }
}

async fn chat_completions(
    State(mock): State<Arc<MockProvider>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = mock.record(&headers, body) {
        return response;
    }
    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "  Mood: eerie.\nThemes: fog, loss  "},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn analyze_endpoint(
    State(mock): State<Arc<MockProvider>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(response) = mock.record(&headers, body) {
        return response;
    }
    Json(json!({ "analysis": "Themes: bridges" })).into_response()
}

async fn spawn_mock(mock: Arc<MockProvider>) -> String {
    init_test_logging();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/analyze", post(analyze_endpoint))
        .with_state(mock);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        default_retry_after: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_chat_backend_sends_prompt_and_parses_answer() {
    let mock = Arc::new(MockProvider::default());
    let base = spawn_mock(mock.clone()).await;
    let backend = ChatCompletionBackend::new(
        http_client(),
        &format!("{base}/v1/"),
        Some("sk-test".to_owned()),
        "gpt-3.5-turbo",
        300,
    );

    let outcome = backend.attempt("walking through fog").await.unwrap();
    assert_eq!(
        outcome,
        AttemptOutcome::Completed("Mood: eerie.\nThemes: fog, loss".to_owned())
    );

    let body = mock.bodies.lock().unwrap()[0].clone();
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 300);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.last().unwrap()["role"], "user");
    assert!(messages
        .last()
        .unwrap()["content"]
        .as_str()
        .unwrap()
        .contains("walking through fog"));
    assert_eq!(
        mock.auth_headers.lock().unwrap()[0].as_deref(),
        Some("Bearer sk-test")
    );
}

#[tokio::test]
async fn test_chat_backend_reports_rate_limit_hint() {
    let mock = Arc::new(MockProvider {
        rate_limited_calls: 1,
        ..MockProvider::default()
    });
    let base = spawn_mock(mock).await;
    let backend =
        ChatCompletionBackend::new(http_client(), &format!("{base}/v1"), None, "m", 100);

    let outcome = backend.attempt("a queue").await.unwrap();
    assert_eq!(
        outcome,
        AttemptOutcome::RateLimited {
            retry_after: Some(Duration::ZERO)
        }
    );
}

#[tokio::test]
async fn test_client_retries_through_real_429s() {
    let mock = Arc::new(MockProvider {
        rate_limited_calls: 2,
        ..MockProvider::default()
    });
    let base = spawn_mock(mock.clone()).await;
    let client = AnalysisClient::new(
        Arc::new(ChatCompletionBackend::new(
            http_client(),
            &format!("{base}/v1"),
            None,
            "m",
            100,
        )),
        fast_policy(),
    );

    let analysis = client.fetch_analysis("a long line").await.unwrap();

    assert!(analysis.contains("Themes: fog, loss"));
    assert_eq!(mock.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_server_error_is_terminal() {
    let mock = Arc::new(MockProvider {
        fail_status: Some(500),
        ..MockProvider::default()
    });
    let base = spawn_mock(mock.clone()).await;
    let client = AnalysisClient::new(
        Arc::new(ChatCompletionBackend::new(
            http_client(),
            &format!("{base}/v1"),
            None,
            "m",
            100,
        )),
        fast_policy(),
    );

    let error = client.fetch_analysis("a crash").await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceError);
    assert!(error.message.contains("provider exploded"));
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_endpoint_backend_round_trip() {
    let mock = Arc::new(MockProvider::default());
    let base = spawn_mock(mock.clone()).await;
    let backend = EndpointBackend::new(http_client(), &format!("{base}/analyze"));

    let outcome = backend.attempt("crossing a bridge").await.unwrap();

    assert_eq!(
        outcome,
        AttemptOutcome::Completed("Themes: bridges".to_owned())
    );
    assert_eq!(
        mock.bodies.lock().unwrap()[0],
        json!({ "description": "crossing a bridge" })
    );
}

#[tokio::test]
async fn test_unreachable_provider_is_unavailable() {
    init_test_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = EndpointBackend::new(http_client(), &format!("http://{addr}/analyze"));
    let error = backend.attempt("nobody home").await.unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceUnavailable);
}
