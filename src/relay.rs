//! The relay sequence shared by the server and the function adapters:
//! method gate, body parse, key check, one upstream call, reply mapping.
use std::time::Instant;

use anyhow::Context;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::error::RelayError;
use crate::upstream::{AnthropicClient, MessagesRequest};

pub const SERVER_DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const FUNCTION_DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_MAX_TOKENS: u64 = 4000;

/// Per-deployment constants of the relay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayProfile {
    /// Model used when the caller omits `model`.
    pub default_model: String,
    /// Append `metadata { duration_ms, timestamp }` to upstream successes.
    pub attach_metadata: bool,
    /// Serve the `GET /` health probe.
    pub health_route: bool,
}

impl RelayProfile {
    pub fn server() -> Self {
        Self {
            default_model: SERVER_DEFAULT_MODEL.to_string(),
            attach_metadata: true,
            health_route: true,
        }
    }

    pub fn function() -> Self {
        Self {
            default_model: FUNCTION_DEFAULT_MODEL.to_string(),
            attach_metadata: false,
            health_route: false,
        }
    }

    pub fn with_default_model<S>(mut self, model: S) -> Self
    where
        S: Into<String>,
    {
        self.default_model = model.into();
        self
    }
}

/// Inbound body as sent by the caller. Never mutated after parsing.
///
/// Each field is `None` only when the key is absent; present values, `null`
/// included, are forwarded untouched.
#[derive(Debug, Default, PartialEq)]
pub struct RelayRequest {
    /// Credential for the upstream service.
    pub api_key: Option<Value>,
    /// Opaque to the relay.
    pub messages: Option<Value>,
    /// ID of the model to use.
    pub model: Option<Value>,
    /// The maximum number of tokens to generate.
    pub max_tokens: Option<Value>,
}

impl RelayRequest {
    /// Reads the known keys of a parsed body. Anything but an object carries
    /// no fields, so it ends up without an API key; `null` has no fields to
    /// read at all.
    pub fn from_body(body: Value) -> anyhow::Result<Self> {
        let mut fields = match body {
            Value::Object(fields) => fields,
            Value::Null => anyhow::bail!("cannot read properties of null request body"),
            _ => Map::new(),
        };

        Ok(Self {
            api_key: fields.remove("apiKey"),
            messages: fields.remove("messages"),
            model: fields.remove("model"),
            max_tokens: fields.remove("max_tokens"),
        })
    }

    /// The credential when it is present and not empty or falsy.
    pub fn api_key(&self) -> Option<String> {
        match self.api_key.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(key) if key.is_empty() => None,
            Value::String(key) => Some(key.clone()),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Transport-neutral outcome of one relay attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: StatusCode,
    /// `None` only for pre-flight replies.
    pub body: Option<Value>,
}

impl RelayReply {
    fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            body: None,
        }
    }

    /// Serialized body; empty for pre-flight replies.
    pub fn body_string(&self) -> String {
        self.body
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default()
    }
}

impl From<RelayError> for RelayReply {
    fn from(err: RelayError) -> Self {
        Self {
            status: err.status(),
            body: Some(err.body()),
        }
    }
}

/// Headers attached to every reply, whatever the outcome.
pub fn response_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ),
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ),
    ]
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub(crate) fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone, Debug)]
pub struct Relay {
    profile: RelayProfile,
    client: AnthropicClient,
}

impl Relay {
    pub fn new(profile: RelayProfile, client: AnthropicClient) -> Self {
        Self { profile, client }
    }

    pub fn profile(&self) -> &RelayProfile {
        &self.profile
    }

    /// Handles one inbound request. Never fails: every error becomes a reply.
    #[instrument(name = "relay", skip(self, body), fields(body_len = body.len()))]
    pub async fn handle(&self, method: &Method, body: &[u8]) -> RelayReply {
        if *method == Method::OPTIONS {
            return RelayReply::preflight();
        }
        if *method != Method::POST {
            return RelayError::MethodNotAllowed.into();
        }

        match self.forward(body).await {
            Ok(body) => RelayReply {
                status: StatusCode::OK,
                body: Some(body),
            },
            Err(err) => {
                if let RelayError::Internal(ref cause) = err {
                    tracing::error!("relay failed: {:#}", cause);
                }
                err.into()
            }
        }
    }

    async fn forward(&self, body: &[u8]) -> Result<Value, RelayError> {
        let body: Value = serde_json::from_slice(body).context("failed to parse request body")?;
        let request = RelayRequest::from_body(body)?;

        let api_key = request.api_key().ok_or(RelayError::MissingApiKey)?;

        let outbound = MessagesRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| Value::from(self.profile.default_model.as_str())),
            max_tokens: request
                .max_tokens
                .clone()
                .unwrap_or_else(|| Value::from(DEFAULT_MAX_TOKENS)),
            messages: request.messages.clone(),
        };

        tracing::info!(model = %outbound.model, "starting Claude API call");
        let started = Instant::now();

        let response = self
            .client
            .send(&api_key, &outbound)
            .await
            .with_context(|| format!("request to {} failed", self.client.endpoint()))?;

        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(duration_ms, "Claude API call completed in {}ms", duration_ms);

        let status = response.status();
        if !status.is_success() {
            let details = response
                .text()
                .await
                .context("failed to read upstream error body")?;
            tracing::error!(status = status.as_u16(), "Claude API error: {}", details);
            return Err(RelayError::Upstream {
                status,
                status_text: status
                    .canonical_reason()
                    .unwrap_or(status.as_str())
                    .to_string(),
                details,
            });
        }

        let mut data: Value = response
            .json()
            .await
            .context("failed to decode upstream response")?;

        if self.profile.attach_metadata {
            if let Value::Object(fields) = &mut data {
                fields.insert(
                    "metadata".to_string(),
                    json!({
                        "duration_ms": duration_ms,
                        "timestamp": timestamp_now(),
                    }),
                );
            }
        }

        Ok(data)
    }
}
