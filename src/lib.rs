//! ccstats
//!
//! Token usage and cost statistics for the JSONL logs Claude Code writes under
//! `~/.claude`, plus a pass-through recorder for hook events.
//!
//! ## Architecture Overview
//!
//! - [`relation`] - Reads schema-drifting JSONL files into one union-schema table
//! - [`models`] - Typed views over rows, value coercion, result types
//! - [`pricing`] - Static per-model pricing tiers
//! - [`aggregator`] - Token totals, total cost, cost by project
//! - [`hooks`] - Best-effort hook event statistics
//! - [`daily`] - Per-day activity statistics
//! - [`events`] - Recent usage events timeline
//! - [`recorder`] - Appends hook events to a daily log and echoes the input
//! - [`report`] - Human-readable report sections
//! - [`analyzer`] - The report flows run by the CLI
//! - [`config`] - Configuration with file and environment variable support
//! - [`logging`] - Structured logging setup
//!
//! ## Example
//!
//! ```no_run
//! use ccstats::aggregator::UsageAggregator;
//! use ccstats::pricing::PricingTable;
//! use ccstats::relation::{JsonlSource, Relation};
//!
//! # fn example() -> ccstats::error::Result<()> {
//! let source = JsonlSource::new("/home/me/.claude", "projects/**/*.jsonl");
//! let relation = Relation::build(&source)?;
//! let aggregator = UsageAggregator::new(&relation, PricingTable::standard());
//!
//! let totals = aggregator.global_token_totals()?;
//! let cost = aggregator.global_cost()?;
//! let top = aggregator.cost_by_project(10)?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod daily;
pub mod error;
pub mod events;
pub mod hooks;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod recorder;
pub mod relation;
pub mod report;
pub mod timestamp_parser;

pub use analyzer::StatsAnalyzer;
pub use error::{Result, StatsError};
pub use relation::Relation;
