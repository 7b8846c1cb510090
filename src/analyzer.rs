//! Report flows
//!
//! [`StatsAnalyzer`] ties the pieces together for one invocation:
//!
//! 1. **Discovery**: resolves the Claude home and builds the usage relation from
//!    `projects/**/*.jsonl`
//! 2. **Aggregation**: token totals, total cost, cost by project
//! 3. **Hooks**: probes `hooks/` and, when there is data, adds hook statistics
//!
//! The daily and events flows reuse the same usage relation.
//!
//! Within the usage section the first failing step is reported and ends that
//! section. The hooks section is independent and always attempted afterwards.
//! Only an unresolvable home directory, or a failure to write the report
//! itself, is returned as an error.

use crate::aggregator::UsageAggregator;
use crate::config::{Config, PROJECTS_GLOB};
use crate::daily::{daily_stats, DailyReport};
use crate::events::{recent_events, EventsReport};
use crate::hooks::HookAggregator;
use crate::pricing::PricingTable;
use crate::relation::{JsonlSource, Relation};
use crate::report::ReportWriter;
use anyhow::Result;
use chrono::Utc;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub struct StatsAnalyzer<'a> {
    config: &'a Config,
    pricing: &'static PricingTable,
}

impl<'a> StatsAnalyzer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            pricing: PricingTable::standard(),
        }
    }

    fn usage_relation(&self, claude_home: &Path) -> crate::error::Result<Relation> {
        let source = JsonlSource::new(claude_home, PROJECTS_GLOB);
        let relation = Relation::build(&source)?;

        let stats = relation.stats();
        if stats.files_matched == 0 {
            info!(home = %claude_home.display(), "No usage log files found");
        } else if stats.files_read == 0 {
            warn!(
                files_skipped = stats.files_skipped,
                "Usage log files were found but none could be read"
            );
        }

        Ok(relation)
    }

    /// Full usage report followed by the optional hooks section.
    pub fn run_report<W: Write>(&self, out: W) -> Result<()> {
        let claude_home = self.config.claude_home()?;
        let mut report = ReportWriter::new(out);

        self.usage_section(&claude_home, &mut report)?;
        self.hooks_section(&claude_home.join("hooks"), &mut report)?;

        Ok(())
    }

    fn usage_section<W: Write>(&self, claude_home: &Path, report: &mut ReportWriter<W>) -> Result<()> {
        let relation = match self.usage_relation(claude_home) {
            Ok(relation) => relation,
            Err(e) => {
                warn!(error = %e, "Usage relation could not be built");
                report.step_error("creating usage relation", &e)?;
                return Ok(());
            }
        };

        let aggregator = UsageAggregator::new(&relation, self.pricing);

        match aggregator.global_token_totals() {
            Ok(totals) => report.token_totals(&totals)?,
            Err(e) => {
                warn!(error = %e, "Token totals failed");
                report.step_error("getting token statistics", &e)?;
                return Ok(());
            }
        }

        match aggregator.global_cost() {
            Ok(cost) => report.total_cost(cost)?,
            Err(e) => {
                warn!(error = %e, "Global cost failed");
                report.step_error("getting cost statistics", &e)?;
                return Ok(());
            }
        }

        let limit = self.config.report.project_limit;
        match aggregator.cost_by_project(limit) {
            Ok(projects) => report.project_costs(&projects, limit)?,
            Err(e) => {
                warn!(error = %e, "Cost by project failed");
                report.step_error("getting cost by project", &e)?;
            }
        }

        Ok(())
    }

    fn hooks_section<W: Write>(&self, hooks_dir: &Path, report: &mut ReportWriter<W>) -> Result<()> {
        let Some(relation) = HookAggregator::probe(hooks_dir) else {
            return Ok(());
        };

        let tool_limit = self.config.report.tool_limit;
        let stats = HookAggregator::new(&relation).stats(tool_limit);
        report.hook_stats(&stats, tool_limit)?;

        Ok(())
    }

    /// Daily activity report over the last `days` days.
    pub fn run_daily<W: Write>(&self, out: W, days: u32) -> Result<Option<DailyReport>> {
        let claude_home = self.config.claude_home()?;
        let mut report = ReportWriter::new(out);

        let relation = match self.usage_relation(&claude_home) {
            Ok(relation) => relation,
            Err(e) => {
                warn!(error = %e, "Usage relation could not be built");
                report.step_error("creating usage relation", &e)?;
                return Ok(None);
            }
        };

        let daily = daily_stats(&relation, days, Utc::now());
        report.daily(&daily)?;

        Ok(Some(daily))
    }

    /// Usage events from the last `minutes` minutes, newest first, at most `limit`.
    pub fn run_events<W: Write>(
        &self,
        out: W,
        minutes: u32,
        limit: usize,
    ) -> Result<Option<EventsReport>> {
        let claude_home = self.config.claude_home()?;
        let mut report = ReportWriter::new(out);

        let relation = match self.usage_relation(&claude_home) {
            Ok(relation) => relation,
            Err(e) => {
                warn!(error = %e, "Usage relation could not be built");
                report.step_error("creating usage relation", &e)?;
                return Ok(None);
            }
        };

        let events = recent_events(&relation, minutes, limit, Utc::now());
        report.events(&events)?;

        Ok(Some(events))
    }
}
