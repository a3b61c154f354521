use anyhow::{Context, Result};
use betsy_core::AssistantSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upper bound on concurrently open HTTP sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7480".to_string()
}
fn default_max_sessions() -> usize {
    1024
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.assistant.color_attribute.trim().is_empty() {
        anyhow::bail!("assistant.color_attribute must not be empty");
    }
    if config.assistant.size_attribute.trim().is_empty() {
        anyhow::bail!("assistant.size_attribute must not be empty");
    }
    if config.assistant.greeting.trim().is_empty() {
        anyhow::bail!("assistant.greeting must not be empty");
    }
    if config.server.max_sessions < 1 {
        anyhow::bail!("server.max_sessions must be >= 1");
    }
    Ok(())
}
