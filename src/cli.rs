//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// AnnoAgree - inter-annotator agreement calculator
///
/// Score how consistently several annotators labeled the same sequence,
/// using the multi-rater kappa statistic. Text/JSON reports.
///
/// Examples:
///   annoagree --input annotations.json
///   annoagree --input annotations.json --format json -o agreement.json
///   annoagree --input annotations.json --fail-below 0.6
///   annoagree --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON file containing the worker annotations
    ///
    /// Expected shape: {"workers": [["B-POS", "O"], ["B-POS", "B-POS"]]}.
    /// When omitted, a built-in example is scored and the raw score is
    /// printed to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format for the report (text, json)
    ///
    /// Overrides the config file setting when provided.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Label that marks an unannotated item
    ///
    /// When every worker assigns this label everywhere, the sequence is
    /// scored as perfect agreement. Defaults to "O".
    #[arg(long, value_name = "LABEL")]
    pub negative_label: Option<String>,

    /// Fail if the score falls below this threshold
    ///
    /// Useful for CI pipelines gating on annotation quality. Exit code 2
    /// when the computed score is below the threshold.
    #[arg(long, value_name = "SCORE")]
    pub fail_below: Option<f64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .annoagree.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .annoagree.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
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

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate threshold range
        if let Some(threshold) = self.fail_below {
            if !(-1.0..=1.0).contains(&threshold) {
                return Err("Fail-below threshold must be between -1.0 and 1.0".to_string());
            }
        }

        // Validate negative label if provided
        if let Some(ref label) = self.negative_label {
            if label.is_empty() {
                return Err("Negative label must not be empty".to_string());
            }
        }

        // Validate input file if provided
        if let Some(ref input_path) = self.input {
            if !input_path.exists() {
                return Err(format!(
                    "Input file does not exist: {}",
                    input_path.display()
                ));
            }
            if !input_path.is_file() {
                return Err(format!("Input path is not a file: {}", input_path.display()));
            }
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
            input: None,
            format: None,
            output: None,
            negative_label: None,
            fail_below: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok_without_input() {
        let args = make_args();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_threshold_range() {
        let mut args = make_args();
        args.fail_below = Some(1.5);
        assert!(args.validate().is_err());

        args.fail_below = Some(0.6);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_negative_label() {
        let mut args = make_args();
        args.negative_label = Some(String::new());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input_file() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/nonexistent/annotations.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
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
}
