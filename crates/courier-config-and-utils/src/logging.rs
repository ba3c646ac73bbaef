//! Logging initialization for the daemon.
//!
//! Wraps the observability crate so every component writes structured JSONL
//! to `~/.courier/logs/courier.jsonl`.

use std::path::PathBuf;

/// Initialize the logging system for the daemon.
///
/// This sets up tracing with:
/// - Structured JSONL output to `log_file`
/// - Log level from RUST_LOG env var or the provided default
/// - Compact stderr output for foreground runs
pub fn init_logging(level: tracing::Level, log_file: PathBuf) -> std::io::Result<()> {
    observability::init_with_config(observability::LogConfig {
        service_name: "courier".into(),
        default_level: level.as_str().to_ascii_lowercase(),
        log_path: Some(log_file),
        also_stderr: true,
    })
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
