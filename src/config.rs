//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.vitaldash.toml` files.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".vitaldash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Dashboard layout and labelling.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Label colors.
    #[serde(default)]
    pub palette: Palette,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "dashboard.html".to_string()
}

/// Where the dataset document comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Local path or http(s) URL of the dataset document.
    #[serde(default = "default_location")]
    pub location: String,

    /// Request timeout in seconds for remote datasets.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_location() -> String {
    "data.json".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Dashboard labelling and table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Page heading.
    #[serde(default = "default_title")]
    pub title: String,

    /// Label used when a categorical field is absent.
    #[serde(default = "default_unknown_label")]
    pub unknown_label: String,

    /// Gender categories that get their own risk chart.
    #[serde(default = "default_gender_categories")]
    pub gender_categories: Vec<String>,

    /// Maximum rows in the recent-records table.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Risk label rendered red in the table.
    #[serde(default = "default_high_label")]
    pub high_label: String,

    /// Risk label rendered yellow in the table.
    #[serde(default = "default_medium_label")]
    pub medium_label: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            unknown_label: default_unknown_label(),
            gender_categories: default_gender_categories(),
            max_rows: default_max_rows(),
            high_label: default_high_label(),
            medium_label: default_medium_label(),
        }
    }
}

fn default_title() -> String {
    "Neonatal Vital Signs Dashboard".to_string()
}

fn default_unknown_label() -> String {
    "Unknown".to_string()
}

fn default_gender_categories() -> Vec<String> {
    vec!["Male".to_string(), "Female".to_string()]
}

fn default_max_rows() -> usize {
    20
}

fn default_high_label() -> String {
    "High".to_string()
}

fn default_medium_label() -> String {
    "Medium".to_string()
}

/// Label to color table shared by every chart.
///
/// Labels without an entry are drawn with `fallback`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    /// Color for labels missing from `colors`.
    #[serde(default = "default_fallback_color")]
    pub fallback: String,

    /// Known label colors.
    #[serde(default = "default_colors")]
    pub colors: IndexMap<String, String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            fallback: default_fallback_color(),
            colors: default_colors(),
        }
    }
}

fn default_fallback_color() -> String {
    "#60a5fa".to_string()
}

fn default_colors() -> IndexMap<String, String> {
    [
        ("Low", "#22c55e"),
        ("Medium", "#eab308"),
        ("High", "#ef4444"),
        ("Unknown", "#9ca3af"),
        ("Male", "#3b82f6"),
        ("Female", "#f472b6"),
    ]
    .into_iter()
    .map(|(label, color)| (label.to_string(), color.to_string()))
    .collect()
}

impl Palette {
    /// Color for a label, or the fallback color.
    pub fn color_for(&self, label: &str) -> &str {
        self.colors
            .get(label)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// One color per label.
    pub fn colors_for(&self, labels: &[String]) -> Vec<String> {
        labels
            .iter()
            .map(|l| self.color_for(l).to_string())
            .collect()
    }
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided CLI values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.source.location = data.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }
        if let Some(max_rows) = args.max_rows {
            self.dashboard.max_rows = max_rows;
        }
    }

    /// Check the merged configuration.
    ///
    /// The same bounds `Args::validate` applies to CLI values also hold
    /// for values that came from the config file.
    pub fn validate(&self) -> Result<()> {
        if self.source.location.trim().is_empty() {
            bail!("source.location must not be empty");
        }
        if self.source.timeout_seconds == 0 {
            bail!("source.timeout_seconds must be at least 1");
        }
        if self.dashboard.max_rows == 0 {
            bail!("dashboard.max_rows must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
