//! Human-readable report rendering.
//!
//! Every section starts with a `=== Title ===` header followed by left-aligned
//! `label: value` lines. Output goes to any [`Write`] so the same code serves
//! stdout and tests.

use crate::daily::DailyReport;
use crate::events::EventsReport;
use crate::models::{HookStats, ProjectCost, TokenTotals};
use colored::Colorize;
use std::fmt::Display;
use std::io::{self, Write};

const PROJECT_COLUMN_WIDTH: usize = 30;
const HOOK_COLUMN_WIDTH: usize = 20;

pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{}",
            format!("=== {} ===", title).bright_cyan().bold()
        )
    }

    /// `Error <action>: <reason>`, reported in place of a section.
    pub fn step_error(&mut self, action: &str, error: &dyn Display) -> io::Result<()> {
        writeln!(self.out, "{} {}: {}", "Error".red().bold(), action, error)
    }

    pub fn token_totals(&mut self, totals: &TokenTotals) -> io::Result<()> {
        self.section("Token Usage Statistics")?;
        let rows = [
            ("Input tokens", totals.input),
            ("Output tokens", totals.output),
            ("Cache read tokens", totals.cache_read),
            ("Cache creation tokens", totals.cache_creation),
            ("Grand total tokens", totals.grand_total),
        ];
        for (label, value) in rows {
            writeln!(self.out, "{}: {}", label, value.unwrap_or(0))?;
        }
        Ok(())
    }

    pub fn total_cost(&mut self, cost: f64) -> io::Result<()> {
        self.section("Cost Analysis")?;
        writeln!(
            self.out,
            "Total cost: {} USD",
            format!("${:.2}", cost).bright_green().bold()
        )
    }

    pub fn project_costs(&mut self, projects: &[ProjectCost], limit: usize) -> io::Result<()> {
        self.section(&format!("Cost by Project (Top {})", limit))?;
        for project in projects {
            writeln!(
                self.out,
                "{:<width$}: {} USD",
                project.project_name,
                format!("${:.2}", project.cost).bright_green(),
                width = PROJECT_COLUMN_WIDTH
            )?;
        }
        Ok(())
    }

    pub fn hook_stats(&mut self, stats: &HookStats, tool_limit: usize) -> io::Result<()> {
        self.section("Hooks Statistics")?;
        writeln!(self.out, "Total hook events: {}", stats.total)?;

        if let Some(by_type) = stats.by_type.as_ref().filter(|by_type| !by_type.is_empty()) {
            writeln!(self.out)?;
            writeln!(self.out, "Hook events by type:")?;
            for entry in by_type {
                writeln!(
                    self.out,
                    "  {:<width$}: {}",
                    entry.event_type,
                    entry.count,
                    width = HOOK_COLUMN_WIDTH
                )?;
            }
        }

        if let Some(tools) = &stats.top_tools {
            writeln!(self.out)?;
            writeln!(self.out, "Top {} tool usage from hooks:", tool_limit)?;
            if tools.is_empty() {
                writeln!(self.out, "  No tool usage data found")?;
            }
            for tool in tools {
                writeln!(
                    self.out,
                    "  {:<width$}: {}",
                    tool.tool,
                    tool.count,
                    width = HOOK_COLUMN_WIDTH
                )?;
            }
        }

        Ok(())
    }

    pub fn events(&mut self, report: &EventsReport) -> io::Result<()> {
        self.section(&format!(
            "Recent Events (last {} minutes, max {})",
            report.window_minutes, report.limit
        ))?;

        if report.events.is_empty() {
            return writeln!(self.out, "No events in this period");
        }

        for event in &report.events {
            let tokens = &event.tokens;
            writeln!(
                self.out,
                "{}  {:<10} {:<28} {:<20} in: {} out: {} cache write: {} cache read: {}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().bright_white(),
                event.event_type.as_deref().unwrap_or("-"),
                event.model.as_deref().unwrap_or("-"),
                event.project_name.as_deref().unwrap_or("-"),
                tokens.input.unwrap_or(0),
                tokens.output.unwrap_or(0),
                tokens.cache_creation.unwrap_or(0),
                tokens.cache_read.unwrap_or(0)
            )?;
        }
        Ok(())
    }

    pub fn daily(&mut self, report: &DailyReport) -> io::Result<()> {
        self.section(&format!("Daily Activity (last {} days)", report.window_days))?;

        if report.days.is_empty() {
            writeln!(self.out, "No activity in this period")?;
        }

        for day in &report.days {
            writeln!(
                self.out,
                "{}  sessions: {:>4}  interactions: {:>5}  projects: {:>3}  tokens: {:>12}",
                day.date.format("%Y-%m-%d").to_string().bright_white().bold(),
                day.sessions,
                day.interactions,
                day.active_projects,
                day.total_tokens()
            )?;
            writeln!(
                self.out,
                "            input: {}  output: {}  cache write: {}  cache read: {}  active {} - {}",
                day.input_tokens,
                day.output_tokens,
                day.cache_creation_tokens,
                day.cache_read_tokens,
                day.first_activity.format("%H:%M:%S"),
                day.last_activity.format("%H:%M:%S")
            )?;
        }

        let summary = &report.summary;
        self.section("Daily Summary")?;
        writeln!(self.out, "Active days: {}", summary.total_days)?;
        writeln!(self.out, "Total sessions: {}", summary.total_sessions)?;
        writeln!(self.out, "Total tokens: {}", summary.total_tokens)?;
        writeln!(self.out, "Avg sessions per day: {:.2}", summary.avg_sessions_per_day)?;
        writeln!(
            self.out,
            "Avg interactions per day: {:.2}",
            summary.avg_interactions_per_day
        )?;
        writeln!(self.out, "Avg tokens per day: {}", summary.avg_tokens_per_day)?;
        match summary.most_active_day {
            Some(date) => writeln!(self.out, "Most active day: {}", date.format("%Y-%m-%d")),
            None => writeln!(self.out, "Most active day: -"),
        }
    }
}
