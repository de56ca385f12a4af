//! # Configuration
//!
//! Process settings from the environment plus the JSON server file.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: `MAX_LINE_LENGTH` framer cap
//! - 1.0.0: Initial JSON server config

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default location of the server file
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// A channel to join, optionally protected by a key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    pub channel: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Connection and identity settings read from the JSON file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub nickname: String,
    /// Password sent to NickServ when identifying
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl ServerConfig {
    /// Load and validate a server file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to open config file {path}"))?;
        Self::from_json(&contents).with_context(|| format!("Bad config file {path}"))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: ServerConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address.trim().is_empty() {
            return Err(anyhow::anyhow!("address must not be empty"));
        }
        if self.port == 0 {
            return Err(anyhow::anyhow!("port must not be zero"));
        }
        if self.nickname.trim().is_empty() || self.nickname.contains(' ') {
            return Err(anyhow::anyhow!(
                "nickname must be a single non-empty word: {:?}",
                self.nickname
            ));
        }
        for entry in &self.channels {
            if entry.channel.is_empty() || entry.channel.contains(' ') {
                return Err(anyhow::anyhow!("invalid channel name: {:?}", entry.channel));
            }
        }
        Ok(())
    }
}

/// Everything the bot needs at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub config_path: String,
    pub log_level: String,
    /// Cap on unterminated inbound data; unbounded when unset
    pub max_line_length: Option<usize>,
}

impl Config {
    /// Read `DINGBOT_CONFIG`, `LOG_LEVEL` and `MAX_LINE_LENGTH`, then load
    /// the server file.
    pub fn from_env() -> Result<Self> {
        let config_path =
            std::env::var("DINGBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let max_line_length = match std::env::var("MAX_LINE_LENGTH") {
            Ok(value) => Some(
                value
                    .parse::<usize>()
                    .with_context(|| format!("MAX_LINE_LENGTH is not a number: {value}"))?,
            ),
            Err(_) => None,
        };

        let server = ServerConfig::load(&config_path)?;

        Ok(Config {
            server,
            config_path,
            log_level,
            max_line_length,
        })
    }
}
