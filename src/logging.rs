//! Logging infrastructure using tracing + tracing-subscriber
//!
//! Console output goes to stderr so that stdout carries only assistant replies.
//! Optional rolling file output and JSON formatting are driven by
//! `[logging]` in the configuration; `RUST_LOG` can refine per-module levels.

use std::fs;
use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::LoggingSettings;
use crate::error::{Error, Result};

/// Guards that must be held for the lifetime of the application
/// to ensure logs are flushed properly
pub struct LogGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system from configuration and CLI flags
pub fn init_logging(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Result<LogGuards> {
    let level = determine_level(settings, verbose, quiet);
    let env_filter = build_env_filter(level)?;
    let console_layer = build_console_layer(settings.json_format);

    let (file_layer, file_guard) = match settings.file {
        Some(ref log_file) => {
            let (layer, guard) = build_file_layer(
                log_file,
                settings.max_file_size_mb,
                settings.max_files,
                settings.json_format,
            )?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        level = %level,
        file = ?settings.file,
        json = settings.json_format,
        "Logging initialized"
    );

    Ok(LogGuards {
        _file_guard: file_guard,
    })
}

/// Minimal stderr logging for commands that run before configuration is loaded
pub fn init_simple(level: Level) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// Determine the effective log level based on settings and CLI flags
fn determine_level(settings: &LoggingSettings, verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => parse_level(&settings.level),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the environment filter with support for RUST_LOG
fn build_env_filter(level: Level) -> Result<EnvFilter> {
    let directive = |s: String| -> Result<Directive> {
        s.parse()
            .map_err(|e| Error::Config(format!("Invalid log directive '{}': {}", s, e)))
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()))
        .add_directive(directive(format!("persona_agent={}", level))?)
        .add_directive(directive("hyper=warn".to_string())?)
        .add_directive(directive("reqwest=warn".to_string())?)
        .add_directive(directive("rustls=warn".to_string())?);

    Ok(filter)
}

/// Build the console output layer
fn build_console_layer<S>(json_format: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    if json_format {
        Box::new(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(true)
                .compact(),
        )
    }
}

/// Build the file logging layer with rotation
fn build_file_layer<S>(
    log_file: &str,
    max_size_mb: u64,
    max_files: u32,
    json_format: bool,
) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let path = Path::new(log_file);
    let directory = path.parent().unwrap_or(Path::new("."));

    fs::create_dir_all(directory).map_err(|e| Error::IoWrite {
        path: directory.to_path_buf(),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("agent.log");

    // tracing-appender only rotates by time; small size budgets rotate hourly
    let rotation = if max_size_mb > 0 && max_size_mb < 10 {
        Rotation::HOURLY
    } else {
        Rotation::DAILY
    };

    let file_appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name)
        .filename_suffix("log")
        .max_log_files(max_files as usize)
        .build(directory)
        .map_err(|e| Error::Config(format!("Failed to create log file appender: {}", e)))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let layer: Box<dyn Layer<S> + Send + Sync> = if json_format {
        Box::new(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false),
        )
    } else {
        Box::new(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false),
        )
    };

    Ok((layer, guard))
}
