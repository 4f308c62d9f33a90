use super::SweepConfig;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokio::fs;
use tracing::debug;

impl SweepConfig {
    /// Parse a configuration from TOML and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SweepConfig =
            toml::from_str(content).context("Failed to parse sweep config as TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from YAML and validate it
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty YAML document deserializes to null, not an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: SweepConfig =
            serde_yaml::from_str(content).context("Failed to parse sweep config as YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format from its extension
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read sweep config: {}", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(anyhow!(
                "Unsupported config format: {} (expected .toml, .yaml or .yml)",
                path.display()
            )),
        }
        .with_context(|| format!("Invalid sweep config: {}", path.display()))?;

        debug!("Loaded sweep config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}
