//! Client configuration
//!
//! Settings come from an optional TOML file with command-line overrides.
//! The WebSocket endpoint is always derived from the configured server
//! origin, so only one URL needs to be maintained.

use crate::{HiwarError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// How captured audio reaches the backend
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    /// One HTTP POST carrying the whole utterance after recording ends
    SingleShot,
    /// Continuous WebSocket stream of 250 ms audio chunks while recording
    #[default]
    Streaming,
}

/// How the two-party transcript is laid out
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChatLayout {
    /// User and assistant messages in separate columns
    #[default]
    Split,
    /// Messages interleaved chronologically
    Interleaved,
}

/// Client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the assistant backend (http or https)
    pub server_url: String,

    /// Transport variant used for recording sessions
    pub transport: TransportMode,

    /// Transcript layout
    pub layout: ChatLayout,

    /// Streaming chunk interval in milliseconds
    pub chunk_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            transport: TransportMode::default(),
            layout: ChatLayout::default(),
            chunk_interval_ms: 250,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HiwarError::ConfigError(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&text)
            .map_err(|e| HiwarError::ConfigError(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn base_url(&self) -> Result<Url> {
        Url::parse(&self.server_url)
            .map_err(|e| HiwarError::ConfigError(format!("Invalid server URL '{}': {}", self.server_url, e)))
    }

    /// Endpoint for the single-shot voice exchange
    pub fn voice_url(&self) -> Result<Url> {
        let mut url = self.base_url()?;
        url.set_path("/api/voice");
        Ok(url)
    }

    /// WebSocket endpoint for the streaming session, derived from the
    /// server origin (http becomes ws, https becomes wss)
    pub fn ws_url(&self) -> Result<Url> {
        let mut url = self.base_url()?;
        let scheme = match url.scheme() {
            "https" | "wss" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| HiwarError::ConfigError(format!("Cannot derive WebSocket scheme for '{}'", self.server_url)))?;
        url.set_path("/ws/audio");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://localhost:8000");
        assert_eq!(config.transport, TransportMode::Streaming);
        assert_eq!(config.chunk_interval_ms, 250);
    }

    #[test]
    fn test_voice_url() {
        let config = Config::default();
        assert_eq!(config.voice_url().unwrap().as_str(), "http://localhost:8000/api/voice");
    }

    #[test]
    fn test_ws_scheme_derived_from_origin() {
        let mut config = Config::default();
        assert_eq!(config.ws_url().unwrap().as_str(), "ws://localhost:8000/ws/audio");

        config.server_url = "https://assistant.example.com".to_string();
        assert_eq!(config.ws_url().unwrap().as_str(), "wss://assistant.example.com/ws/audio");
    }

    #[test]
    fn test_invalid_server_url() {
        let config = Config {
            server_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(config.ws_url().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let text = r#"
            server_url = "https://example.org"
            transport = "single-shot"
            layout = "interleaved"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.transport, TransportMode::SingleShot);
        assert_eq!(config.layout, ChatLayout::Interleaved);
        // Unspecified fields keep their defaults
        assert_eq!(config.chunk_interval_ms, 250);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hiwar.toml");
        std::fs::write(&path, "server_url = \"http://10.0.0.5:9000\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server_url, "http://10.0.0.5:9000");
        assert_eq!(config.ws_url().unwrap().as_str(), "ws://10.0.0.5:9000/ws/audio");
    }
}
