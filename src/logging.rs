//! Tracing setup.
//!
//! Logs go to stdout and, when a log file can be opened, to that file as
//! well. `RUST_LOG` overrides the configured level when set.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Map a configured level name onto a filter directive. Unknown names
/// fall back to `info` rather than failing startup.
fn level_directive(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(level)))
}

/// Initialize logging to stdout plus the configured log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let path = Path::new(&config.file);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let log_file = Arc::new(File::create(path)?);

    tracing_subscriber::fmt()
        .with_env_filter(filter_for(&config.level))
        .with_writer(std::io::stdout.and(log_file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(())
}

/// Stdout-only fallback for when the log file cannot be opened.
pub fn init_console_only(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_target(true)
        .init();
}
