//! https://docs.anthropic.com/en/api/messages
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Body sent to the messages endpoint. Values are carried as the caller
/// sent them; the upstream judges their shape.
#[derive(Serialize, Debug, PartialEq)]
pub struct MessagesRequest {
    pub model: Value,
    pub max_tokens: Value,
    /// Omitted when the caller sent none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Value>,
}

#[derive(Clone, Debug)]
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnthropicClient {
    /// `timeout` of `None` waits for the upstream indefinitely.
    pub fn new<S>(endpoint: S, timeout: Option<Duration>) -> anyhow::Result<Self>
    where
        S: Into<String>,
    {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build upstream http client")?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Issues exactly one POST; the response is returned whatever its status.
    pub async fn send(
        &self,
        api_key: &str,
        request: &MessagesRequest,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
    }
}
