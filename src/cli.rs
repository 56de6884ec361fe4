//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// VitalDash - static analytics dashboard for newborn vital signs
///
/// Loads a JSON dataset of vital-sign records, aggregates it and renders
/// risk, gender and temperature charts plus a recent-records table.
///
/// Examples:
///   vitaldash --data data.json
///   vitaldash --data http://localhost:5000/data --output vitals.html
///   vitaldash --data data.json --format json --output dashboard.json
///   vitaldash --data data.json --summary
///   vitaldash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset location (local path or http(s) URL)
    ///
    /// Falls back to the config file, then to ./data.json.
    #[arg(short, long, value_name = "PATH|URL", env = "VITALDASH_DATA")]
    pub data: Option<String>,

    /// Output file path for the dashboard
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (html, json, markdown)
    #[arg(long, default_value = "html", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .vitaldash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum number of rows in the recent-records table
    #[arg(long, value_name = "COUNT")]
    pub max_rows: Option<usize>,

    /// Request timeout in seconds for remote datasets
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Load the dataset and print field coverage without rendering
    #[arg(long)]
    pub summary: bool,

    /// Generate a default .vitaldash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Self-contained HTML page (default)
    #[default]
    Html,
    /// JSON chart and table model
    Json,
    /// Markdown tables
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref data) = self.data {
            if data.trim().is_empty() {
                return Err("Dataset location must not be empty".to_string());
            }
            if data.contains("://")
                && !data.starts_with("http://")
                && !data.starts_with("https://")
            {
                return Err("Dataset URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.max_rows == Some(0) {
            return Err("Max rows must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: Some("data.json".to_string()),
            output: None,
            format: OutputFormat::Html,
            config: None,
            max_rows: None,
            timeout: None,
            verbose: false,
            quiet: false,
            summary: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_path_and_url() {
        let mut args = make_args();
        assert!(args.validate().is_ok());

        args.data = Some("https://example.com/data".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_unsupported_scheme() {
        let mut args = make_args();
        args.data = Some("ftp://example.com/data.json".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let mut args = make_args();
        args.max_rows = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "vitaldash",
            "--data",
            "vitals.json",
            "--format",
            "markdown",
            "--max-rows",
            "5",
        ])
        .unwrap();
        assert_eq!(args.data.as_deref(), Some("vitals.json"));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(args.max_rows, Some(5));
    }
}
