//! Serverless shape: event in, response out.

use claude_relay::function::{invoke, invoke_json, FunctionEvent};
use claude_relay::relay::RelayProfile;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

fn post_event(body: Value) -> FunctionEvent {
    FunctionEvent {
        http_method: "POST".to_string(),
        body: Some(body.to_string()),
    }
}

#[tokio::test]
async fn success_body_is_serialized_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-api-key", API_KEY))
        .and(body_json(json!({
            "model": "claude-3-sonnet-20240229",
            "max_tokens": 4000,
            "messages": hi_messages(),
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_message()))
        .expect(1)
        .mount(&server)
        .await;

    let response = invoke(
        &relay_for(&server, RelayProfile::function()),
        post_event(json!({ "apiKey": API_KEY, "messages": hi_messages() })),
    )
    .await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.headers["access-control-allow-origin"], "*");
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body, upstream_message());
}

#[tokio::test]
async fn upstream_error_keeps_status_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .expect(1)
        .mount(&server)
        .await;

    let response = invoke(
        &relay_for(&server, RelayProfile::function()),
        post_event(json!({ "apiKey": API_KEY, "messages": hi_messages() })),
    )
    .await;

    assert_eq!(response.status_code, 401);
    assert_eq!(response.headers["content-type"], "application/json");
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], "Claude API error: Unauthorized");
    assert_eq!(body["details"], "invalid x-api-key");
}

#[tokio::test]
async fn missing_key_is_rejected_before_forwarding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = invoke(
        &relay_for(&server, RelayProfile::function()),
        post_event(json!({ "messages": [] })),
    )
    .await;

    assert_eq!(response.status_code, 400);
    assert_eq!(response.body, r#"{"error":"API key is required"}"#);
}

#[tokio::test]
async fn method_matching_is_case_sensitive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_message()))
        .expect(0)
        .mount(&server)
        .await;

    let mut event = post_event(json!({ "apiKey": API_KEY, "messages": hi_messages() }));
    event.http_method = "post".to_string();

    let response = invoke(&relay_for(&server, RelayProfile::function()), event).await;

    assert_eq!(response.status_code, 405);
}

#[tokio::test]
async fn raw_event_is_relayed_and_garbage_is_a_500() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_message()))
        .expect(1)
        .mount(&server)
        .await;
    let relay = relay_for(&server, RelayProfile::function());

    let event = json!({
        "httpMethod": "POST",
        "body": json!({ "apiKey": API_KEY, "messages": hi_messages() }).to_string(),
    });
    let response = invoke_json(&relay, &event.to_string()).await;
    assert_eq!(response.status_code, 200);

    let response = invoke_json(&relay, "{\"httpMethod\":").await;
    assert_eq!(response.status_code, 500);
    assert_eq!(response.headers["content-type"], "application/json");
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["error"], "Internal server error");
}
