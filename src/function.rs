//! Single-invocation entry point: one event in, one response out.
use std::collections::BTreeMap;

use axum::http::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::RelayError;
use crate::relay::{response_headers, Relay, RelayReply};

/// The inbound event handed over by the serverless host.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// What the host turns back into an HTTP response.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<RelayReply> for FunctionResponse {
    fn from(reply: RelayReply) -> Self {
        let headers = response_headers()
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();

        Self {
            status_code: reply.status.as_u16(),
            headers,
            body: reply.body_string(),
        }
    }
}

#[instrument(
    name = "function",
    skip(relay, event),
    fields(invocation_id = %Uuid::new_v4(), method = %event.http_method)
)]
pub async fn invoke(relay: &Relay, event: FunctionEvent) -> FunctionResponse {
    // Methods match case-sensitively; an unparsable one can only be a 405.
    let method = Method::from_bytes(event.http_method.as_bytes()).unwrap_or(Method::CONNECT);
    let body = event.body.unwrap_or_default();

    relay.handle(&method, body.as_bytes()).await.into()
}

/// Like [`invoke`], but starting from the raw event text, so an unreadable
/// event still gets a structured 500.
pub async fn invoke_json(relay: &Relay, input: &str) -> FunctionResponse {
    match serde_json::from_str::<FunctionEvent>(input) {
        Ok(event) => invoke(relay, event).await,
        Err(err) => {
            tracing::error!("failed to parse function event: {}", err);
            let err = anyhow::Error::new(err).context("failed to parse function event");
            RelayReply::from(RelayError::from(err)).into()
        }
    }
}
