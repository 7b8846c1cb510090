//! Structured logging configuration
//!
//! Provides:
//! - JSON or pretty output
//! - Console (stderr) or daily-rolling file output
//! - Configurable via environment variables
//! - A per-invocation run span
//!
//! Console logs never go to stdout: stdout carries the report, or the echoed
//! input when running as a hook.

use crate::config::Config;
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

/// Initialize the logging system based on configuration.
///
/// The returned guard must be kept alive for file output to be flushed.
pub fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.output.as_str() {
        "file" => Some(init_file_logging(
            env_filter,
            &config.logging.format,
            &config.paths.log_directory,
        )),
        _ => {
            init_console_logging(env_filter, &config.logging.format);
            None
        }
    }
}

fn init_console_logging(filter: EnvFilter, format: &str) {
    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match format {
        "json" => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init(),
        _ => subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(true)
                    .with_span_events(FmtSpan::NONE),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to initialise logging: {}", e);
    }
}

fn init_file_logging(filter: EnvFilter, format: &str, log_dir: &std::path::Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "ccstats.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match format {
        "json" => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        _ => subscriber
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to initialise logging: {}", e);
    }

    guard
}

/// Open the span that wraps one invocation, tagged with a fresh run id.
pub fn run_span(command: &str) -> Span {
    tracing::info_span!("run", run_id = %Uuid::new_v4(), command = command)
}

