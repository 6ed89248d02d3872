//! Medigate configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MedigateError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedigateConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for MedigateConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            knowledge: KnowledgeConfig::default(),
            database: DatabaseConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl MedigateConfig {
    /// Load config from the default path (~/.medigate/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MedigateError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| MedigateError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| MedigateError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Medigate home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".medigate")
    }
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8000 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Knowledge base configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Path to the knowledge JSON file (a top-level array of condition records).
    #[serde(default = "default_kb_path")]
    pub path: String,
}

fn default_kb_path() -> String { "data/medical_knowledge.json".into() }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self { path: default_kb_path() }
    }
}

/// SQLite database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String { "~/.medigate/medigate.db".into() }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_db_path() }
    }
}

/// Matching engine score weights.
///
/// The score of a candidate condition is
/// `(matches / entry_symptom_count) * specificity_weight + matches * overlap_weight`.
/// The defaults must stay at 10.0 and 1.0 for compatibility with the
/// established ranking behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_specificity_weight")]
    pub specificity_weight: f64,
    #[serde(default = "default_overlap_weight")]
    pub overlap_weight: f64,
}

fn default_specificity_weight() -> f64 { 10.0 }
fn default_overlap_weight() -> f64 { 1.0 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            specificity_weight: default_specificity_weight(),
            overlap_weight: default_overlap_weight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = MedigateConfig::default();
        assert_eq!(cfg.gateway.port, 8000);
        assert_eq!(cfg.engine.specificity_weight, 10.0);
        assert_eq!(cfg.engine.overlap_weight, 1.0);
    }

    #[test]
    fn test_toml_roundtrip() {
        let cfg = MedigateConfig::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: MedigateConfig = toml::from_str(&s).unwrap();
        assert_eq!(back.gateway.host, cfg.gateway.host);
        assert_eq!(back.database.path, cfg.database.path);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: MedigateConfig = toml::from_str("[gateway]\nport = 9000\n").unwrap();
        assert_eq!(cfg.gateway.port, 9000);
        assert_eq!(cfg.gateway.host, "0.0.0.0");
        assert_eq!(cfg.engine.specificity_weight, 10.0);
    }
}
