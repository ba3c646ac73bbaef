//! # Observability
//!
//! Structured logging for the courier daemon.
//!
//! Components are **log producers**. They call `observability::init()` (or
//! `init_with_config`) once at startup and use plain `tracing` macros
//! everywhere else. Every event is written as one JSON object per line to an
//! append-only file:
//!
//! ```text
//! {"timestamp":"2024-01-15T10:30:00.000000Z","level":"INFO","service":"courier",...,"message":"delivery sent"}
//! ```
//!
//! The sink is never read back by the daemon. Tail it with
//! `tail -f ~/.courier/logs/courier.jsonl | jq`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "courier".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     })
//!     .ok();
//!
//!     tracing::info!("ready");
//! }
//! ```

mod file_sink;
mod json_layer;

use std::io;
use std::path::PathBuf;

pub use file_sink::{default_log_path, AppendOnlyWriter};
pub use json_layer::{JsonLayer, LogEntry};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, included in every log line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.courier/logs/courier.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr for foreground runs.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize the observability layer with default settings.
pub fn init(service_name: &str) -> io::Result<()> {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    })
}

/// Initialize the observability layer with custom configuration.
///
/// Fails only if the log file cannot be opened. Installing a subscriber when
/// one is already set is a no-op, so tests may call this repeatedly.
pub fn init_with_config(config: LogConfig) -> io::Result<()> {
    file_sink::init_file_subscriber(&config)
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
