// ABOUTME: Axum HTTP testing utilities for integration tests
// ABOUTME: Provides helpers to drive routers without a listener, including reading SSE streams
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(dead_code)]

use axum::{
    body::{Body, BodyDataStream},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use futures_util::StreamExt;
use serde::Serialize;
use std::time::Duration;
use tower::ServiceExt;

/// How long stream reads wait before a test fails
const STREAM_TIMEOUT: Duration = Duration::from_secs(5);

/// Helper to build and execute HTTP requests against Axum routers
pub struct AxumTestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl AxumTestRequest {
    /// Create a request with an arbitrary method
    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Create a new GET request
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Create a new POST request
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Create a new PUT request
    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    /// Create a new OPTIONS request
    pub fn options(uri: &str) -> Self {
        Self::new(Method::OPTIONS, uri)
    }

    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Set a raw body without touching headers
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add JSON body to the request
    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_string(data).expect("Failed to serialize JSON"));
        self.headers.push((
            header::CONTENT_TYPE.as_str().to_owned(),
            "application/json".to_owned(),
        ));
        self
    }

    fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);

        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }

        let body = self.body.unwrap_or_default();
        builder
            .body(Body::from(body))
            .expect("Failed to build request")
    }

    /// Execute the request against an Axum router
    pub async fn send(self, app: Router) -> AxumTestResponse {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        AxumTestResponse::from_response(response).await
    }

    /// Execute a request against an SSE endpoint and keep the body open
    ///
    /// SSE endpoints return long-lived streams, so the body is handed back as
    /// an [`SseTestStream`] that reads one event at a time.
    pub async fn open_stream(self, app: Router) -> SseTestStream {
        let response = app
            .oneshot(self.build())
            .await
            .expect("Failed to execute request");

        SseTestStream {
            status: response.status(),
            headers: response.headers().clone(),
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }
}

/// Wrapper around Axum HTTP response for testing
pub struct AxumTestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl AxumTestResponse {
    /// Create from response by eagerly reading the body
    async fn from_response(response: axum::http::Response<Body>) -> Self {
        use axum::body::to_bytes;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get the response status code as u16 for easy assertion
    pub const fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get the response status code as `StatusCode`
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Get a response header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get the response body as a string
    pub fn text(self) -> String {
        String::from_utf8(self.body).expect("Failed to decode response as UTF-8")
    }

    /// Assert that the status code matches
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {}",
            expected, self.status
        );
        self
    }

    /// Assert the three CORS headers every bridge response carries
    pub fn assert_cors(self) -> Self {
        assert_cors_headers(&self.headers);
        self
    }
}

/// One parsed SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseTestEvent {
    /// `event:` field (empty when absent)
    pub event: String,
    /// Joined `data:` lines
    pub data: String,
}

/// Open SSE response read event by event
pub struct SseTestStream {
    status: StatusCode,
    headers: HeaderMap,
    body: BodyDataStream,
    buffer: String,
}

impl SseTestStream {
    /// Response status
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Get a response header as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Response headers
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Next event, skipping keep-alive comments; `None` once the stream ended
    pub async fn next_event(&mut self) -> Option<SseTestEvent> {
        loop {
            if let Some(event) = self.take_buffered_event() {
                return Some(event);
            }
            let chunk = tokio::time::timeout(STREAM_TIMEOUT, self.body.next())
                .await
                .expect("Timed out waiting for SSE event")?;
            let chunk = chunk.expect("Failed to read SSE body");
            self.buffer.push_str(std::str::from_utf8(&chunk).expect("SSE body is not UTF-8"));
        }
    }

    /// Wait until the server ends the stream, discarding remaining events
    pub async fn expect_end(mut self) {
        while self.next_event().await.is_some() {}
    }

    fn take_buffered_event(&mut self) -> Option<SseTestEvent> {
        loop {
            let end = self.buffer.find("\n\n")?;
            let block: String = self.buffer.drain(..end + 2).collect();

            let mut event = String::new();
            let mut data: Vec<&str> = Vec::new();
            for line in block.lines() {
                if let Some(value) = line.strip_prefix("event:") {
                    event = value.trim_start().to_owned();
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value));
                }
            }
            if !event.is_empty() || !data.is_empty() {
                return Some(SseTestEvent {
                    event,
                    data: data.join("\n"),
                });
            }
            // comment-only block (keep-alive)
        }
    }
}

/// Assert the bridge's CORS headers on a header map
pub fn assert_cors_headers(headers: &HeaderMap) {
    let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    assert_eq!(get("access-control-allow-origin"), Some("*"));
    assert_eq!(
        get("access-control-allow-methods"),
        Some("GET, POST, OPTIONS")
    );
    assert_eq!(get("access-control-allow-headers"), Some("Content-Type"));
}
