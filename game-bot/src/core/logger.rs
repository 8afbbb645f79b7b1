//! Tracing setup: plain-text lines to stdout and an append-only log file.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{
    fmt::format::{FmtSpan, Writer},
    fmt::time::FormatTime,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter, so `.env`
/// must be loaded first. Fails if a subscriber is already set.
pub fn init_tracing(log_file_path: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = Arc::new(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)?,
    );

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let writer = io::stdout.and(file);

    let event_format = tracing_subscriber::fmt::format()
        .with_timer(LocalTimestamp)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(false);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .event_format(event_format)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {}", e))?;

    Ok(())
}
