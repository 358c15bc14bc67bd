use claude_relay::config::Config;
use claude_relay::startup;
use claude_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    telemetry::init_subscriber(
        "claude_relay",
        "info",
        std::io::stdout,
        config.otlp_endpoint.clone(),
    )?;

    startup::run_server(config).await
}
