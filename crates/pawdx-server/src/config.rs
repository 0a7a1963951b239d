use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_DATA_PATH: &str = "attached_asset/symptom_data.csv";
pub const DEFAULT_LOG_FILTER: &str = "info,pawdx_server=debug";
pub const DEFAULT_FIREWORKS_ENDPOINT: &str = "https://api.fireworks.ai/inference/v1/chat/completions";
pub const DEFAULT_FIREWORKS_MODEL: &str = "accounts/sentientfoundation-serverless/models/dobby-mini-unhinged-plus-llama-3-1-8b";
const DEFAULT_EXPLAINER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ExplainerConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self { api_key: None, endpoint: DEFAULT_FIREWORKS_ENDPOINT.into(), model: DEFAULT_FIREWORKS_MODEL.into(), timeout: Duration::from_secs(DEFAULT_EXPLAINER_TIMEOUT_SECS) }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_path: PathBuf,
    pub explainer: ExplainerConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let addr = get("PAWDX_ADDR").unwrap_or_else(|| DEFAULT_ADDR.into());
        let addr: SocketAddr = addr.parse().with_context(|| format!("PAWDX_ADDR is not a socket address: {addr}"))?;
        let timeout = match get("EXPLAINER_TIMEOUT_SECS") {
            Some(v) => v.parse::<u64>().with_context(|| format!("EXPLAINER_TIMEOUT_SECS is not a number: {v}"))?,
            None => DEFAULT_EXPLAINER_TIMEOUT_SECS,
        };
        Ok(Self {
            addr,
            data_path: get("PAWDX_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.into()).into(),
            explainer: ExplainerConfig {
                api_key: get("FIREWORKS_API_KEY"),
                endpoint: get("FIREWORKS_ENDPOINT").unwrap_or_else(|| DEFAULT_FIREWORKS_ENDPOINT.into()),
                model: get("FIREWORKS_MODEL").unwrap_or_else(|| DEFAULT_FIREWORKS_MODEL.into()),
                timeout: Duration::from_secs(timeout),
            },
        })
    }
}
