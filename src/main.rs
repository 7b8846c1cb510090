use anyhow::{Context, Result};
use ccstats::analyzer::StatsAnalyzer;
use ccstats::config::{Config, HOOK_EVENT_ENV};
use ccstats::daily::clamp_days;
use ccstats::logging;
use ccstats::recorder::HookRecorder;
use clap::{Parser, Subcommand};
use std::io;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "ccstats")]
#[command(about = "Token usage and cost statistics for Claude Code logs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a hook event from stdin and echo the input to stdout
    Hook,
    /// Show daily activity statistics
    Daily {
        /// Number of days to include (1-365)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show recent usage events, newest first
    Events {
        /// Trailing window in minutes
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        minutes: Option<u32>,
        /// Maximum number of events to show
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    // Dropped when main returns, which flushes file logs on every exit path.
    let _log_guard = logging::init_logging(&config);

    match cli.command {
        Some(Commands::Hook) => {
            let span = logging::run_span("hook");
            let _entered = span.enter();

            match run_hook(&config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %format!("{:#}", e), "Hook handler failed");
                    eprintln!("Hook handler error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Some(Commands::Daily { days }) => {
            let span = logging::run_span("daily");
            let _entered = span.enter();

            let days = clamp_days(days.unwrap_or(config.report.daily_days));
            let analyzer = StatsAnalyzer::new(&config);
            exit_code(analyzer.run_daily(io::stdout().lock(), days).map(|_| ()))
        }
        Some(Commands::Events { minutes, limit }) => {
            let span = logging::run_span("events");
            let _entered = span.enter();

            let minutes = minutes.unwrap_or(config.report.events_minutes);
            let limit = limit.map_or(config.report.events_limit, |limit| limit as usize);
            let analyzer = StatsAnalyzer::new(&config);
            exit_code(
                analyzer
                    .run_events(io::stdout().lock(), minutes, limit)
                    .map(|_| ()),
            )
        }
        None => {
            let span = logging::run_span("report");
            let _entered = span.enter();

            let analyzer = StatsAnalyzer::new(&config);
            exit_code(analyzer.run_report(io::stdout().lock()))
        }
    }
}

fn run_hook(config: &Config) -> Result<()> {
    let hooks_dir = config.hooks_dir()?;
    let event_type = std::env::var(HOOK_EVENT_ENV).ok();
    let recorder = HookRecorder::new(hooks_dir).with_event_type(event_type);

    recorder
        .record(io::stdin().lock(), io::stdout().lock())
        .context("recording hook event")?;
    Ok(())
}

fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
