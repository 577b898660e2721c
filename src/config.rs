// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for reposcope
//!
//! Loads configuration from .reposcoperc.toml in current directory or
//! ~/.config/reposcope/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const DEFAULT_CONTEXT_LINES: usize = 2;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.openai.com/v1/embeddings";

const LOCAL_CONFIG_FILE: &str = ".reposcoperc.toml";

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
    Html,
}

/// `[embeddings]` table
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmbeddingsSection {
    /// Use semantic search by default
    pub enabled: Option<bool>,
    /// Embedding model identifier
    pub model: Option<String>,
    /// Full URL of the embeddings endpoint
    pub endpoint: Option<String>,
}

/// Configuration loaded from .reposcoperc.toml or ~/.config/reposcope/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of results to return
    pub max_results: Option<usize>,
    /// Lines of context shown around each hit
    pub context_lines: Option<usize>,
    /// Default output format (text, json or html)
    pub default_format: Option<String>,
    /// Extra path substrings to exclude from search
    pub exclude_patterns: Vec<String>,
    /// Extension allowlist; empty means the built-in default set
    pub extensions: Vec<String>,
    pub embeddings: EmbeddingsSection,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .reposcoperc.toml in current directory
    /// 2. ~/.config/reposcope/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(Path::new(LOCAL_CONFIG_FILE)) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = global_config_path(&home);
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get output format from config, parsing the string to ConfigOutputFormat
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format
            .as_ref()
            .and_then(|s| match s.to_lowercase().as_str() {
                "json" => Some(ConfigOutputFormat::Json),
                "text" => Some(ConfigOutputFormat::Text),
                "html" => Some(ConfigOutputFormat::Html),
                _ => None,
            })
    }

    /// Merge CLI options with config (CLI wins)
    pub fn merge_max_results(&self, cli_value: Option<usize>) -> usize {
        cli_value
            .or(self.max_results)
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_RESULTS)
    }

    pub fn merge_context_lines(&self, cli_value: Option<usize>) -> usize {
        cli_value
            .or(self.context_lines)
            .unwrap_or(DEFAULT_CONTEXT_LINES)
    }

    pub fn merge_use_embeddings(&self, cli_flag: bool) -> bool {
        cli_flag || self.embeddings.enabled.unwrap_or(false)
    }

    pub fn merge_extensions(&self, cli_value: &[String]) -> Vec<String> {
        if cli_value.is_empty() {
            self.extensions.clone()
        } else {
            cli_value.to_vec()
        }
    }

    pub fn embedding_model(&self) -> String {
        self.embeddings
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string())
    }

    pub fn embedding_endpoint(&self) -> String {
        self.embeddings
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_EMBEDDING_ENDPOINT.to_string())
    }
}

fn global_config_path(home: &Path) -> PathBuf {
    home.join(".config").join("reposcope").join("config.toml")
}
