use std::time::Duration;

use clap::Parser;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::relay::{FUNCTION_DEFAULT_MODEL, SERVER_DEFAULT_MODEL};
use crate::upstream::DEFAULT_UPSTREAM_URL;

pub const ENV_PREFIX: &str = "CLAUDE_RELAY_";

/// Settings of the always-on server.
#[derive(Parser, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to
    #[arg(long, short = 'H', default_value_t = String::from("0.0.0.0"))]
    pub host: String,
    /// Port to bind to
    #[arg(long, short, default_value_t = 3000)]
    pub port: u16,

    /// Endpoint of OpenTelemetry collector
    #[arg(long, short)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otlp_endpoint: Option<String>,

    /// Messages endpoint requests are relayed to
    #[arg(long, default_value_t = String::from(DEFAULT_UPSTREAM_URL))]
    pub upstream_url: String,
    /// Upstream timeout in milliseconds; unset waits indefinitely
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_timeout_ms: Option<u64>,
    /// Model used when a request names none
    #[arg(long, default_value_t = String::from(SERVER_DEFAULT_MODEL))]
    pub default_model: String,
}

impl Config {
    /// CLI values first, then `CLAUDE_RELAY_*`, then the bare `PORT` variable.
    pub fn figment(cli: Config) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(cli))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Env::raw().only(&["PORT"]))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(Config::parse()).extract()
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_ms.map(Duration::from_millis)
    }
}

/// Settings of the single-invocation function. The host owns the port.
#[derive(Debug, Serialize, Deserialize)]
pub struct FunctionConfig {
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    #[serde(default)]
    pub upstream_timeout_ms: Option<u64>,
    #[serde(default = "default_function_model")]
    pub default_model: String,
}

impl FunctionConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new().merge(Env::prefixed(ENV_PREFIX)).extract()
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_ms.map(Duration::from_millis)
    }
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_function_model() -> String {
    FUNCTION_DEFAULT_MODEL.to_string()
}
