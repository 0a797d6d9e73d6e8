//! TagTranslit - MP3 tag and file name transliterator
//!
//! This is the main entry point: it parses the command line, loads the
//! configuration and the transliteration map, then renames and retags every
//! file found under the given paths.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tagtranslit::cli::Args;
use tagtranslit::config::{Config, LoggingConfig};
use tagtranslit::map::TranslitMap;
use tagtranslit::recovery::EncodingRecovery;
use tagtranslit::transliterate::Transliterator;
use tagtranslit::workflow::{
    FileReport, ProcessingOutcome, RunSummary, TranslitContext, Workflow,
};

const DEFAULT_CONFIG_FILE: &str = "tagtranslit.toml";

const EXIT_FILE_FAILED: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    match run(&args) {
        Ok(summary) if summary.has_failures() => {
            eprintln!(
                "{} of {} files failed",
                summary.failed(),
                summary.total()
            );
            ExitCode::from(EXIT_FILE_FAILED)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(args: &Args) -> Result<RunSummary> {
    // Load configuration
    let (config, config_path) = load_config(args.config.as_deref())?;

    // Setup logging to console and, when configured, to file
    let _guard = setup_logging(args.verbose, &config.logging)?;

    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => debug!("Using built-in configuration"),
    }

    let result = execute(args, &config);
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn execute(args: &Args, config: &Config) -> Result<RunSummary> {
    let recovery = EncodingRecovery::from_config(&config.recovery)?;
    info!(
        "Recovering {} text read as {}",
        recovery.destination().name(),
        recovery.source().name()
    );

    // The map must load before any file is touched
    let map = TranslitMap::from_file(&args.map)
        .with_context(|| format!("Cannot load transliteration map {}", args.map.display()))?;

    let context = TranslitContext::new(Transliterator::new(map, recovery), args.options());
    let workflow = Workflow::with_defaults(context);

    let files = workflow.collect_files(&args.inputs);
    Ok(workflow.process_files_with(&files, print_report))
}

/// Resolve the configuration file: explicit path, then the working directory, then defaults
fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    match explicit {
        Some(path) => {
            let config = Config::from_file(path)?;
            Ok((config, Some(path.to_path_buf())))
        }
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if local.exists() {
                let config = Config::from_file(&local)?;
                Ok((config, Some(local)))
            } else {
                Ok((Config::default(), None))
            }
        }
    }
}

fn print_report(report: &FileReport) {
    match &report.outcome {
        ProcessingOutcome::Success {
            renamed_to: Some(destination),
        } => println!("{} -> {}", report.path.display(), destination.display()),
        ProcessingOutcome::Success { renamed_to: None } => println!("{}", report.path.display()),
        ProcessingOutcome::Failure { message, .. } => {
            println!("{} - failed ({})", report.path.display(), message)
        }
    }
}

/// Setup logging to stderr and, optionally, a daily rotated file
fn setup_logging(verbose: bool, logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    // Determine log level
    let log_level = if verbose {
        LevelFilter::DEBUG
    } else {
        logging
            .level
            .parse::<LevelFilter>()
            .with_context(|| format!("Invalid log level '{}'", logging.level))?
    };

    // Create console layer
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Create file layer when a log directory is configured
    let (file_layer, guard) = match &logging.directory {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir).with_context(|| {
                format!("Failed to create log directory {}", log_dir.display())
            })?;

            let file_appender = rolling::daily(log_dir, "tagtranslit.log");
            let (non_blocking_file, guard) = non_blocking(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false); // No ANSI colors in file

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Setup layered subscriber
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    debug!("Logging initialized - console: {}", log_level);

    Ok(guard)
}
