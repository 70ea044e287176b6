//! AnnoAgree - Inter-Annotator Agreement Calculator
//!
//! A CLI tool that scores how consistently several annotators labeled
//! the same item sequence, using the multi-rater kappa statistic.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad input file, config failure, etc.)
//!   2 - Score below --fail-below threshold

mod agreement;
mod cli;
mod config;
mod models;
mod report;

use agreement::AgreementTask;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::{AgreementReport, AnnotationSet, Interpretation, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("AnnoAgree v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the calculation
    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Agreement calculation failed: {}", e);
            eprintln!("\nError: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .annoagree.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".annoagree.toml");

    if path.exists() {
        eprintln!("⚠️  .annoagree.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .annoagree.toml")?;

    println!("✅ Created .annoagree.toml with default settings.");
    println!("   Edit it to customize the negative label and report output.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete calculation workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Get the annotation set
    let demo_mode = args.input.is_none();
    let set = match args.input {
        Some(ref path) => load_annotations(path)?,
        None => demo_annotation_set(),
    };

    info!(
        "Scoring {} workers over {} items",
        set.worker_count(),
        set.item_count()
    );

    // Demo mode prints just the raw score
    if demo_mode {
        let score = agreement::fleiss_kappa(&set.workers)?;
        println!("{}", score);
        return Ok(threshold_exit_code(score, &args));
    }

    // Step 2: Compute the score
    let task = AgreementTask::new(&set)?.with_negative_label(config.labels.negative.clone());
    let score = task.score();

    // Step 3: Build and render the report
    let agreement_report = build_report(&task, score);

    let output = match config.output_format() {
        OutputFormat::Json => report::generate_json_report(&agreement_report)?,
        OutputFormat::Text => {
            report::generate_text_report(&agreement_report, config.report.precision)
        }
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(threshold_exit_code(score, &args))
}

/// Check the --fail-below threshold against the computed score.
fn threshold_exit_code(score: f64, args: &Args) -> i32 {
    if let Some(threshold) = args.fail_below {
        if score < threshold {
            eprintln!(
                "Score {} below threshold {}. Failing (exit code 2).",
                score, threshold
            );
            return 2;
        }
    }
    0
}

/// Build the agreement report for a scored task.
fn build_report(task: &AgreementTask, score: f64) -> AgreementReport {
    let all_negative = task.is_all_negative();
    let label_distribution = task.label_distribution();

    let (observed_agreement, expected_agreement) = if all_negative {
        (None, None)
    } else {
        (
            Some(task.observed_agreement()),
            Some(task.expected_agreement()),
        )
    };

    AgreementReport {
        metadata: ReportMetadata {
            computed_at: Utc::now(),
            worker_count: task.worker_count(),
            item_count: task.item_count(),
            distinct_labels: label_distribution.len(),
        },
        score,
        observed_agreement,
        expected_agreement,
        all_negative,
        label_distribution,
        interpretation: Interpretation::from_score(score),
    }
}

/// The built-in example: three workers labeling the same three tokens.
fn demo_annotation_set() -> AnnotationSet {
    AnnotationSet::new(vec![
        vec!["B-POS".to_string(), "I-POS".to_string(), "O".to_string()],
        vec!["B-POS".to_string(), "O".to_string(), "O".to_string()],
        vec!["B-POS".to_string(), "I-POS".to_string(), "I-POS".to_string()],
    ])
}

/// Load an annotation set from a JSON input file.
fn load_annotations(path: &Path) -> Result<AnnotationSet> {
    debug!("Reading annotations from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    let set = AnnotationSet::from_json_str(&content)
        .with_context(|| format!("Failed to parse annotations from {}", path.display()))?;

    Ok(set)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .annoagree.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
