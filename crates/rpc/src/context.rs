//! Application context - wires config and protocol together

use lendcore_protocol::{LendingProtocol, ProtocolConfig};
use std::path::Path;
use uuid::Uuid;

/// Application context
pub struct AppContext {
    pub protocol: LendingProtocol,
    run_id: String,
}

impl AppContext {
    /// Create a context from an optional JSON config file
    pub fn new(config_path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let config = match config_path {
            Some(path) => ProtocolConfig::from_file(path)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {}", path.display(), e))?,
            None => ProtocolConfig::default(),
        };
        Self::with_config(config)
    }

    pub fn with_config(config: ProtocolConfig) -> Result<Self, anyhow::Error> {
        let protocol = LendingProtocol::new(config)?;
        let run_id = Uuid::new_v4().to_string();
        tracing::debug!(run_id = %run_id, "Context created");
        Ok(Self { protocol, run_id })
    }

    /// Identifier of this run, attached to every log line
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}
