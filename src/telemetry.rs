use anyhow::Context;
use opentelemetry::trace::TraceError;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::{runtime, Resource};
use opentelemetry_semantic_conventions::resource::SERVICE_NAME;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

fn init_tracer(name: &str, otlp_endpoint: String) -> Result<sdktrace::Tracer, TraceError> {
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(otlp_endpoint),
        )
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            opentelemetry::KeyValue::new(SERVICE_NAME, name.to_string()),
        ])))
        .install_batch(runtime::Tokio)
}

/// Compose multiple layers into a `tracing`'s subscriber and install it globally.
///
/// `sink` receives the Bunyan-formatted JSON records. The function binary passes
/// stderr so stdout stays reserved for the invocation result.
pub fn init_subscriber<Sink>(
    name: &str,
    env_filter: &str,
    sink: Sink,
    otlp_endpoint: Option<String>,
) -> anyhow::Result<()>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    LogTracer::init().context("failed to set logger")?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = BunyanFormattingLayer::new(name.into(), sink);

    let registry = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    if let Some(otlp_endpoint) = otlp_endpoint {
        let tracer = init_tracer(name, otlp_endpoint).context("unable to initialize tracer")?;
        let tracer_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        set_global_default(registry.with(tracer_layer)).context("failed to set subscriber")?;
    } else {
        set_global_default(registry).context("failed to set subscriber")?;
    }

    Ok(())
}
