use anyhow::{Context, Result};
use flexi_logger::{DeferredNow, Logger, LoggerHandle, Record};
use std::io::Write;

/// Install the global logger. Log lines go to stderr; the spec is read from
/// `RUST_LOG` and falls back to `default_spec`. Keep the handle alive for the
/// lifetime of the program.
pub fn set_global_logger(default_spec: &str) -> Result<LoggerHandle> {
    Logger::try_with_env_or_str(default_spec)
        .context("Invalid log specification")?
        .log_to_stderr()
        .format(log_format)
        .start()
        .context("Failed to start logger")
}

fn log_format(w: &mut dyn Write, now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
    write!(
        w,
        "[{}] {:<5} [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}
