//! Runs one relay invocation: reads a function event as JSON on stdin and
//! writes the function response as JSON on stdout.
use anyhow::Context;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use claude_relay::config::FunctionConfig;
use claude_relay::function;
use claude_relay::relay::{Relay, RelayProfile};
use claude_relay::telemetry;
use claude_relay::upstream::AnthropicClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = FunctionConfig::load()?;

    telemetry::init_subscriber("claude_function", "info", std::io::stderr, None)?;

    let client = AnthropicClient::new(&config.upstream_url, config.upstream_timeout())?;
    let relay = Relay::new(
        RelayProfile::function().with_default_model(&config.default_model),
        client,
    );

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read event from stdin")?;

    let response = function::invoke_json(&relay, &input).await;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&serde_json::to_vec(&response)?).await?;
    stdout.flush().await?;

    Ok(())
}
