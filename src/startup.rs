use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use axum::Router;
use axum_tracing_opentelemetry::middleware::{OtelAxumLayer, OtelInResponseLayer};
use tower::ServiceBuilder;
use tower_http::request_id::MakeRequestUuid;
use tower_http::{
    trace::TraceLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse},
    ServiceBuilderExt,
};
use tracing::Level;

use crate::config::Config;
use crate::relay::{Relay, RelayProfile};
use crate::routes;
use crate::state::AppState;
use crate::upstream::AnthropicClient;

/// Inbound JSON bodies may carry whole documents.
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route(
        "/api/claude",
        any(routes::relay_claude).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
    );
    if state.relay.profile().health_route {
        router = router.route("/", get(routes::health_check));
    }

    router
        .with_state(state)
        .layer(OtelInResponseLayer)
        .layer(OtelAxumLayer::default())
        .layer(
            ServiceBuilder::new()
                .set_x_request_id(MakeRequestUuid)
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(
                            DefaultMakeSpan::new()
                                .include_headers(false)
                                .level(Level::DEBUG),
                        )
                        .on_response(
                            DefaultOnResponse::new()
                                .include_headers(true)
                                .level(Level::DEBUG),
                        ),
                )
                .propagate_x_request_id(),
        )
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let client = AnthropicClient::new(&config.upstream_url, config.upstream_timeout())
        .context("failed to create upstream client")?;
    let profile = RelayProfile::server().with_default_model(&config.default_model);
    let app = build_router(AppState::new(Relay::new(profile, client)));

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!("Starting server at {}", address);
    match config.upstream_timeout() {
        Some(timeout) => tracing::info!("Upstream calls time out after {:?}", timeout),
        None => tracing::info!("No upstream timeout, calls wait as long as Claude needs"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install CTRL+C signal handler: {}", err);
        std::future::pending::<()>().await;
    }

    opentelemetry::global::shutdown_tracer_provider();
}
