/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed smoke-run configuration
[POS]:    Configuration layer - gateway address and command script
[UPDATE]: When adding new configuration options
*/

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use ib_ws_adapter::{ClientConfig, Command};

/// Top-level configuration for a smoke run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmokeConfig {
    /// Gateway WebSocket endpoint, e.g. `ws://127.0.0.1:8080`
    pub url: String,
    /// Delay before each inbound frame is logged
    #[serde(default)]
    pub message_delay_ms: u64,
    /// Commands fired, in order, once the connection opens
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl SmokeConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let config = ClientConfig::new(&self.url)
            .with_context(|| format!("invalid gateway url '{}'", self.url))?;
        Ok(config.with_message_delay(Duration::from_millis(self.message_delay_ms)))
    }
}
