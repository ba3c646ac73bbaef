//! Append-only JSONL file sink.
//!
//! Every log line is written and flushed in one call, so the file can be
//! tailed while the daemon runs.

use crate::json_layer::JsonLayer;
use crate::LogConfig;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Default log file location: `~/.courier/logs/courier.jsonl`.
///
/// Falls back to the working directory when no home directory is known.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".courier")
        .join("logs")
        .join("courier.jsonl")
}

/// Line-flushing writer that only ever appends to its file.
#[derive(Clone)]
pub struct AppendOnlyWriter {
    inner: Arc<Mutex<BufWriter<File>>>,
}

impl AppendOnlyWriter {
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(8192, file))),
        })
    }
}

impl Write for AppendOnlyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.inner.lock();
        let written = guard.write(buf)?;
        guard.flush()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl<'a> MakeWriter<'a> for AppendOnlyWriter {
    type Writer = AppendOnlyWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber: JSON file layer plus optional stderr layer.
pub(crate) fn init_file_subscriber(config: &LogConfig) -> io::Result<()> {
    let log_path = config.log_path.clone().unwrap_or_else(default_log_path);
    let writer = AppendOnlyWriter::new(&log_path)?;

    let json_layer = JsonLayer::new(config.service_name.clone(), writer);

    let stderr_layer = if config.also_stderr {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
    } else {
        None
    };

    let installed = tracing_subscriber::registry()
        .with(json_layer.with_filter(env_filter(&config.default_level)))
        .with(stderr_layer.map(|l| l.with_filter(env_filter(&config.default_level))))
        .try_init();

    if installed.is_ok() {
        tracing::info!(log_path = %log_path.display(), "observability initialized");
    }

    Ok(())
}
