#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use roomchat::{sweep_inactive_participants, Clock, MessageModel, SweepReport};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a request through the full router and return status and JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Run one presence sweep with the default threshold
    pub async fn sweep(&self) -> SweepReport {
        sweep_inactive_participants(
            self.state.participant_repository.clone(),
            self.state.message_repository.clone(),
            self.state.clock.clone(),
            self.reaper.inactivity_threshold,
        )
        .await
        .unwrap()
    }

    pub fn advance_secs(&self, seconds: i64) {
        self.clock.advance(chrono::Duration::seconds(seconds));
    }

    pub fn clock_now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn join(&self, name: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/participants")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "name": name }).to_string()))
            .unwrap();
        self.send(request).await.0
    }

    pub async fn heartbeat(&self, name: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/status")
            .header("User", name)
            .body(Body::empty())
            .unwrap();
        self.send(request).await.0
    }

    pub async fn say(&self, from: &str, to: &str, text: &str, kind: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/messages")
            .header("content-type", "application/json")
            .header("User", from)
            .body(Body::from(
                json!({ "to": to, "text": text, "type": kind }).to_string(),
            ))
            .unwrap();
        self.send(request).await.0
    }

    pub async fn messages_for(&self, requester: &str, limit: Option<usize>) -> Vec<MessageModel> {
        let uri = match limit {
            Some(limit) => format!("/messages?limit={}", limit),
            None => "/messages".to_string(),
        };
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("User", requester)
            .body(Body::empty())
            .unwrap();
        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(body).unwrap()
    }

    pub async fn participant_names(&self) -> Vec<String> {
        let request = Request::builder()
            .method("GET")
            .uri("/participants")
            .body(Body::empty())
            .unwrap();
        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::OK);
        let mut names: Vec<String> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        names
    }
}
