//! Shared fixtures for the relay integration tests.
#![allow(dead_code)]

use claude_relay::relay::{Relay, RelayProfile};
use claude_relay::upstream::AnthropicClient;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::MockServer;

pub const API_KEY: &str = "sk-x";

pub fn messages_url(server: &MockServer) -> String {
    format!("{}/v1/messages", server.uri())
}

pub fn relay_for(server: &MockServer, profile: RelayProfile) -> Relay {
    relay_with_timeout(server, profile, None)
}

pub fn relay_with_timeout(
    server: &MockServer,
    profile: RelayProfile,
    timeout: Option<Duration>,
) -> Relay {
    let client = AnthropicClient::new(messages_url(server), timeout).unwrap();
    Relay::new(profile, client)
}

pub fn upstream_message() -> Value {
    json!({
        "id": "m1",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": "Hello!" }],
        "model": "claude-3-5-sonnet-20241022",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 10, "output_tokens": 5 }
    })
}

pub fn hi_messages() -> Value {
    json!([{ "role": "user", "content": "hi" }])
}
