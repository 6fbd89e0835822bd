//! Analyzer configuration
//!
//! Values come from, in increasing priority: built-in defaults, an
//! `ifgraph.{toml,yaml,yml,json}` file, and `IFGRAPH_*` environment
//! variables.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interface names excluded from every analysis unless overridden.
pub const DEFAULT_IGNORE_LIST: &[&str] = &["PublishDetails", "File", "Link", "Taxonomy"];

/// File names probed by [`AnalyzerConfig::discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["ifgraph.toml", "ifgraph.yaml", "ifgraph.yml", "ifgraph.json"];

pub const ENV_IGNORE_LIST: &str = "IFGRAPH_IGNORE_LIST";
pub const ENV_FOLLOW_HERITAGE: &str = "IFGRAPH_FOLLOW_HERITAGE";
pub const ENV_STRICT_SYNTAX: &str = "IFGRAPH_STRICT_SYNTAX";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Options that shape one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Declared names dropped before graph assembly.
    #[serde(alias = "ignoreList")]
    pub ignore_list: BTreeSet<String>,

    /// Count `extends`/`implements` supertypes as references.
    #[serde(alias = "followHeritage")]
    pub follow_heritage: bool,

    /// Reject sources whose syntax tree contains error nodes.
    #[serde(alias = "strictSyntax")]
    pub strict_syntax: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            ignore_list: DEFAULT_IGNORE_LIST.iter().map(|s| s.to_string()).collect(),
            follow_heritage: false,
            strict_syntax: false,
        }
    }
}

impl AnalyzerConfig {
    /// Load a config file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let config = match ext {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        tracing::debug!("Loaded analyzer config from {}", path.display());
        Ok(config)
    }

    /// Load the first known config file in `dir`, or the defaults.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Apply `IFGRAPH_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup(ENV_IGNORE_LIST) {
            self.ignore_list = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(flag) = lookup(ENV_FOLLOW_HERITAGE).and_then(|v| parse_flag(&v)) {
            self.follow_heritage = flag;
        }
        if let Some(flag) = lookup(ENV_STRICT_SYNTAX).and_then(|v| parse_flag(&v)) {
            self.strict_syntax = flag;
        }
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore_list.contains(name)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
