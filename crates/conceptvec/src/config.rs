//! Configuration file support for the conceptvec service.
//!
//! Configuration lives in a `conceptvec.toml` file with per-section
//! defaults, so a missing file or a partial file both work. API keys can
//! also come from the environment (`OPENAI_API_KEY`), which wins over
//! nothing but loses to an explicit config entry.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The default config file name.
pub const CONFIG_FILE: &str = "conceptvec.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Embedding artifact locations.
    pub data: DataConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Rationale provider settings.
    pub rationale: RationaleConfig,
    /// Search parameter defaults.
    pub search: SearchConfig,
}

/// Embedding artifact locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the id→vector JSON artifact.
    pub embeddings: PathBuf,
    /// Path to the id→description JSON artifact.
    pub descriptions: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            embeddings: PathBuf::from("embeddings/concept_glove.json"),
            descriptions: PathBuf::from("embeddings/concept_descriptions.json"),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for `serve`.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Rationale provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RationaleConfig {
    /// API key; falls back to `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    /// Model used for rationale generation.
    pub model: String,
    /// Base URL override for compatible endpoints.
    pub base_url: Option<String>,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RationaleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            base_url: None,
            timeout_secs: 60,
        }
    }
}

/// Search parameter defaults, overridable per request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of sampled `(B, C)` pairs.
    pub n: usize,
    /// Minimum similarity for a row to survive.
    pub sim_threshold: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n: conceptvec_search::DEFAULT_SAMPLES,
            sim_threshold: conceptvec_search::DEFAULT_SIM_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or from `conceptvec.toml`
    /// in the current directory when no path is given. A missing default
    /// file yields the built-in defaults; a missing explicit path is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the rationale API key from config or environment.
    pub fn rationale_api_key(&self) -> Option<String> {
        self.rationale
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}
