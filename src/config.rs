//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.annoagree.toml` files.

use crate::cli::OutputFormat;
use crate::models::DEFAULT_NEGATIVE_LABEL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Label settings.
    #[serde(default)]
    pub labels: LabelConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Label settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// The label treated as "no annotation".
    #[serde(default = "default_negative")]
    pub negative: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            negative: default_negative(),
        }
    }
}

fn default_negative() -> String {
    DEFAULT_NEGATIVE_LABEL.to_string()
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format: "text" or "json".
    #[serde(default = "default_format")]
    pub format: String,

    /// Decimal places for scores in rendered reports.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            precision: default_precision(),
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

fn default_precision() -> usize {
    4
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
        let default_path = Path::new(".annoagree.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref label) = args.negative_label {
            self.labels.negative = label.clone();
        }

        if let Some(format) = args.format {
            self.report.format = match format {
                OutputFormat::Text => "text".to_string(),
                OutputFormat::Json => "json".to_string(),
            };
        }
    }

    /// The effective output format after merging.
    ///
    /// Unrecognized format strings fall back to text.
    pub fn output_format(&self) -> OutputFormat {
        match self.report.format.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
