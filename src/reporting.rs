//! Utilities for logging and automated bug reporting.

use std::{path::PathBuf, str::FromStr};

use eyre::Context;
use tracing_appender::{
    non_blocking::{NonBlockingBuilder, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "opmet-query.log";
const DEFAULT_RUST_LOG: &str = "warn,opmet_query=debug,opmet=debug";

/// Options for logging.
#[derive(Clone, Debug)]
pub struct Options {
    /// Log files are written to the `log` directory inside this directory.
    pub data_dir: PathBuf,
    /// How often to rotate the log files.
    pub log_rotation: Rotation,
}

impl Options {
    fn log_dir(&self) -> PathBuf {
        self.data_dir.join("log")
    }
}

/// Keeps the log writers and `sentry` client alive, logs are flushed when it is dropped.
pub struct ReportingGuard {
    _sentry: Option<sentry::ClientInitGuard>,
    _stdout_writer: WorkerGuard,
    _log_file_writer: WorkerGuard,
}

/// Install `color-eyre` as the formatter for error reports and panics.
pub fn setup_error_hooks() -> eyre::Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::new().into_hooks();
    eyre::set_hook(eyre_hook.into_eyre_hook())?;
    std::panic::set_hook(panic_hook.into_panic_hook());
    Ok(())
}

/// Set up `tracing` to log to stdout and to a rolling log file. When the `SENTRY_DSN`
/// environment variable is set, events are also reported to sentry.io.
pub fn setup_logging(options: &Options) -> eyre::Result<ReportingGuard> {
    let sentry = match std::env::var("SENTRY_DSN") {
        Ok(sentry_dsn) => Some(sentry::init(sentry::ClientOptions {
            dsn: Some(
                sentry_dsn
                    .parse()
                    .wrap_err("Unable to parse `SENTRY_DSN` environment variable")?,
            ),
            release: sentry::release_name!(),
            ..sentry::ClientOptions::default()
        })),
        Err(_) => None,
    };

    let log_dir = options.log_dir();
    std::fs::create_dir_all(&log_dir)
        .wrap_err_with(|| format!("Unable to create log directory {:?}", log_dir))?;

    let log_file_appender =
        RollingFileAppender::new(options.log_rotation.clone(), &log_dir, LOG_FILE_NAME);
    let (log_file_writer, log_file_guard) = NonBlockingBuilder::default()
        .buffered_lines_limit(1000)
        .lossy(false)
        .finish(log_file_appender);
    let (stdout_writer, stdout_guard) = NonBlockingBuilder::default()
        .lossy(false)
        .finish(std::io::stdout());

    let rust_log_env: String =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_writer))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(log_file_writer),
        )
        .with(tracing_subscriber::EnvFilter::from_str(rust_log_env.as_str()).unwrap_or_default())
        .with(tracing_error::ErrorLayer::default())
        .with(sentry.as_ref().map(|_| sentry_tracing::layer()))
        .init();

    tracing::info!("Writing logs to {:?}", log_dir);
    if sentry.is_some() {
        tracing::info!("sentry.io reporting is enabled");
    }

    Ok(ReportingGuard {
        _sentry: sentry,
        _stdout_writer: stdout_guard,
        _log_file_writer: log_file_guard,
    })
}
