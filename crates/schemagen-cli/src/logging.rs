//! Structured logging for the schemagen CLI
//!
//! Human-readable console output by default, JSON for machine consumption,
//! and an optional daily-rotated log file.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE: &str = "schemagen.log";

/// Log format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format for development
    Pretty,
    /// JSON format (structured logging)
    Json,
    /// Single-line format
    Compact,
}

impl LogFormat {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            Ok("pretty") | Ok(_) => LogFormat::Pretty,
            Err(_) => LogFormat::Pretty,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stdout only
    Stdout,
    /// Log to file only
    File,
    /// Log to both stdout and file
    Both,
}

impl LogOutput {
    /// Parse from environment variable
    pub fn from_env() -> Self {
        match std::env::var("LOG_OUTPUT").as_deref() {
            Ok("file") => LogOutput::File,
            Ok("both") => LogOutput::Both,
            Ok("stdout") | Ok(_) => LogOutput::Stdout,
            Err(_) => LogOutput::Stdout,
        }
    }
}

/// Initialize the global subscriber
///
/// Environment variables:
/// - `RUST_LOG`: Log level (e.g., "debug", "info", "schemagen_ir=trace")
/// - `LOG_FORMAT`: Output format ("pretty", "json", "compact")
/// - `LOG_OUTPUT`: Where to write logs ("stdout", "file", "both")
/// - `LOG_DIR`: Directory for log files (default: "./logs")
///
/// Examples:
/// ```bash
/// # Trace relation resolution
/// RUST_LOG=schemagen_ir=trace schemagen --check
///
/// # JSON to file
/// LOG_FORMAT=json LOG_OUTPUT=file LOG_DIR=/var/log/schemagen schemagen
/// ```
pub fn init() {
    let format = LogFormat::from_env();
    let output = LogOutput::from_env();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match (output, format) {
        (LogOutput::Stdout, LogFormat::Pretty) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
        (LogOutput::Stdout, LogFormat::Json) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_current_span(true))
                .init();
        }
        (LogOutput::Stdout, LogFormat::Compact) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact())
                .init();
        }
        (LogOutput::File, _) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(file_appender()).with_ansi(false))
                .init();
        }
        // Boxed layers for dynamic dispatch
        (LogOutput::Both, format) => {
            let stdout_layer = match format {
                LogFormat::Pretty => fmt::layer().pretty().with_target(true).boxed(),
                LogFormat::Json => fmt::layer().json().with_current_span(true).boxed(),
                LogFormat::Compact => fmt::layer().compact().boxed(),
            };

            let file_layer = fmt::layer()
                .with_writer(file_appender())
                .with_ansi(false)
                .boxed();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .with(file_layer)
                .init();
        }
    }

    tracing::debug!(format = ?format, output = ?output, "Logging initialized");
    if matches!(output, LogOutput::File | LogOutput::Both) {
        tracing::debug!("  LOG_DIR: {}", log_dir());
    }
}

fn log_dir() -> String {
    std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string())
}

fn file_appender() -> RollingFileAppender {
    let dir = log_dir();
    std::fs::create_dir_all(&dir).ok();
    RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE)
}
