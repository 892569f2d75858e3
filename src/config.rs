//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.ahtboard.toml` files.

use crate::analysis::{AttentionThresholds, DEFAULT_TIMESTAMP_FORMAT, UNKNOWN_QUEUE};
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".ahtboard.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input parsing settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Outlier thresholds.
    #[serde(default)]
    pub attention: AttentionConfig,

    /// Individual metric settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "ahtboard_report.md".to_string()
}

/// How raw cells are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// strftime pattern of the `Próximo` column.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

/// Points-of-attention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionConfig {
    /// Queue held to the tighter limit.
    #[serde(default = "default_priority_queue")]
    pub priority_queue: String,

    /// Limit for the priority queue, in seconds.
    #[serde(default = "default_priority_threshold")]
    pub priority_threshold_secs: u64,

    /// Limit for every other queue, in seconds.
    #[serde(default = "default_threshold")]
    pub default_threshold_secs: u64,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            priority_queue: default_priority_queue(),
            priority_threshold_secs: default_priority_threshold(),
            default_threshold_secs: default_threshold(),
        }
    }
}

fn default_priority_queue() -> String {
    "JV ITAU BMG".to_string()
}

fn default_priority_threshold() -> u64 {
    120
}

fn default_threshold() -> u64 {
    300
}

impl AttentionConfig {
    /// Thresholds in the form the engine consumes.
    pub fn thresholds(&self) -> AttentionThresholds {
        AttentionThresholds {
            priority_queue: self.priority_queue.clone(),
            priority_threshold: secs(self.priority_threshold_secs),
            default_threshold: secs(self.default_threshold_secs),
        }
    }
}

fn secs(value: u64) -> Duration {
    let capped = i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
    Duration::seconds(capped)
}

/// Individual analyst metric settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Queue label excluded from completed/reclassified counts.
    #[serde(default = "default_unknown_queue")]
    pub unknown_queue: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            unknown_queue: default_unknown_queue(),
        }
    }
}

fn default_unknown_queue() -> String {
    UNKNOWN_QUEUE.to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only explicitly provided CLI values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if let Some(ref format) = args.timestamp_format {
            self.input.timestamp_format = format.clone();
        }

        if let Some(ref queue) = args.priority_queue {
            self.attention.priority_queue = queue.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
