use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::instrument;

use crate::error::RelayError;
use crate::relay::{response_headers, RelayReply};
use crate::state::AppState;

/// Any method is routed here; the relay itself answers pre-flight and 405.
#[instrument(name = "claude", skip(state, body))]
pub(crate) async fn relay_claude(
    method: Method,
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => state.relay.handle(&method, &body).await.into_response(),
        // Only a POST body is ever read; other methods keep their usual reply.
        Err(_) if method != Method::POST => state.relay.handle(&method, &[]).await.into_response(),
        Err(rejection) => {
            tracing::error!("failed to read request body: {}", rejection.body_text());
            RelayReply::from(RelayError::Body {
                status: rejection.status(),
                details: rejection.body_text(),
            })
            .into_response()
        }
    }
}

impl IntoResponse for RelayReply {
    fn into_response(self) -> Response {
        let body = self.body_string();
        (self.status, response_headers(), body).into_response()
    }
}
