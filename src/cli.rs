//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// AHTBoard - productivity and AHT analytics for analyst teams
///
/// Reads an accumulated protocol log and reports average handling time
/// per day, analyst and queue, daily productivity, the analyst
/// leaderboard and the protocols that need attention.
///
/// Examples:
///   ahtboard --input dados_acumulados_ana.json
///   ahtboard --input ./dados --analyst ana --format json
///   ahtboard --input ./dados --rank ana,bruno,carla
///   ahtboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Protocol log to analyze
    ///
    /// A JSON file holding an array of rows, or a directory of
    /// `dados_acumulados_*.json` files that are merged.
    #[arg(short, long, value_name = "PATH", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to the config file value, then ahtboard_report.md
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .ahtboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Analyst to build the individual view for
    #[arg(short, long, value_name = "NAME", env = "AHTBOARD_ANALYST")]
    pub analyst: Option<String>,

    /// Analysts to include in the leaderboard (comma-separated)
    ///
    /// Defaults to every analyst in the input.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub rank: Option<Vec<String>>,

    /// strftime pattern of the timestamp column
    ///
    /// Example: --timestamp-format "%Y-%m-%d %H:%M:%S"
    #[arg(long, value_name = "PATTERN")]
    pub timestamp_format: Option<String>,

    /// Queue held to the tighter points-of-attention limit
    #[arg(long, value_name = "QUEUE")]
    pub priority_queue: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .ahtboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
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

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref analyst) = self.analyst {
            if analyst.trim().is_empty() {
                return Err("Analyst name must not be empty".to_string());
            }
        }

        if let Some(ref names) = self.rank {
            if names.iter().all(|n| n.trim().is_empty()) {
                return Err("--rank needs at least one analyst name".to_string());
            }
        }

        if let Some(ref pattern) = self.timestamp_format {
            if !pattern.contains('%') {
                return Err(format!("Timestamp pattern has no fields: {}", pattern));
            }
        }

        // The input may legitimately be absent (empty log), but a path
        // that exists must be a file or a directory we can read.
        if let Some(ref input) = self.input {
            if input.exists() && !input.is_file() && !input.is_dir() {
                return Err(format!("Input is not a file or directory: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the `general.verbose` key of the config file;
    /// `--quiet` overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Analysts selected for the leaderboard, `None` meaning all of them.
    pub fn ranked_analysts(&self) -> Option<Vec<String>> {
        self.rank.as_ref().map(|names| {
            names
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect()
        })
    }
}
