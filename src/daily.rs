//! Daily activity statistics over the usage relation.
//!
//! Rows are bucketed by the UTC calendar date of their top-level `timestamp`.
//! Rows without a parseable timestamp, or older than the window, are ignored.
//! Token values are read leniently here: anything unreadable counts as zero.

use crate::models::{extract_string, UsageRecord};
use crate::relation::Relation;
use crate::timestamp_parser::TimestampParser;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

pub const MIN_DAYS: u32 = 1;
pub const MAX_DAYS: u32 = 365;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub sessions: u64,
    pub interactions: u64,
    pub active_projects: u64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cache_creation_tokens: i64,
    pub cache_read_tokens: i64,
    pub first_activity: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl DayStats {
    pub fn total_tokens(&self) -> i64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub total_days: u64,
    pub total_sessions: u64,
    pub total_tokens: i64,
    pub avg_sessions_per_day: f64,
    pub avg_interactions_per_day: f64,
    pub avg_tokens_per_day: i64,
    pub most_active_day: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub window_days: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Most recent day first
    pub days: Vec<DayStats>,
    pub summary: DailySummary,
}

#[derive(Default)]
struct DayBucket {
    sessions: HashSet<String>,
    projects: HashSet<String>,
    interactions: u64,
    input_tokens: i64,
    output_tokens: i64,
    cache_creation_tokens: i64,
    cache_read_tokens: i64,
    first_activity: Option<DateTime<Utc>>,
    last_activity: Option<DateTime<Utc>>,
}

/// Clamp a requested window into the supported range.
pub fn clamp_days(days: u32) -> u32 {
    days.clamp(MIN_DAYS, MAX_DAYS)
}

pub fn daily_stats(relation: &Relation, days: u32, now: DateTime<Utc>) -> DailyReport {
    let window_days = clamp_days(days);
    let start = now - Duration::days(i64::from(window_days));
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();

    for record in relation.records() {
        let Some(timestamp) = TimestampParser::parse_value(record.get("timestamp")) else {
            continue;
        };
        if timestamp < start {
            continue;
        }

        let bucket = buckets.entry(timestamp.date_naive()).or_default();
        let usage = UsageRecord::from_record_lenient(&record);

        if let Some(session) = extract_string(record.get("sessionId")) {
            bucket.sessions.insert(session);
        }
        if let Some(cwd) = usage.cwd {
            bucket.projects.insert(cwd);
        }
        if extract_string(record.get("type")).as_deref() == Some("user") {
            bucket.interactions += 1;
        }

        let tokens = usage.tokens;
        bucket.input_tokens = bucket.input_tokens.saturating_add(tokens.input.unwrap_or(0));
        bucket.output_tokens = bucket.output_tokens.saturating_add(tokens.output.unwrap_or(0));
        bucket.cache_creation_tokens = bucket
            .cache_creation_tokens
            .saturating_add(tokens.cache_creation.unwrap_or(0));
        bucket.cache_read_tokens = bucket
            .cache_read_tokens
            .saturating_add(tokens.cache_read.unwrap_or(0));

        bucket.first_activity = Some(bucket.first_activity.map_or(timestamp, |t| t.min(timestamp)));
        bucket.last_activity = Some(bucket.last_activity.map_or(timestamp, |t| t.max(timestamp)));
    }

    let days: Vec<DayStats> = buckets
        .into_iter()
        .rev()
        .filter_map(|(date, bucket)| {
            Some(DayStats {
                date,
                sessions: bucket.sessions.len() as u64,
                interactions: bucket.interactions,
                active_projects: bucket.projects.len() as u64,
                input_tokens: bucket.input_tokens,
                output_tokens: bucket.output_tokens,
                cache_creation_tokens: bucket.cache_creation_tokens,
                cache_read_tokens: bucket.cache_read_tokens,
                first_activity: bucket.first_activity?,
                last_activity: bucket.last_activity?,
            })
        })
        .collect();

    let summary = summarize(&days);

    DailyReport {
        window_days,
        start,
        end: now,
        days,
        summary,
    }
}

fn summarize(days: &[DayStats]) -> DailySummary {
    let total_days = days.len() as u64;
    let total_sessions: u64 = days.iter().map(|day| day.sessions).sum();
    let total_interactions: u64 = days.iter().map(|day| day.interactions).sum();
    let total_tokens = days
        .iter()
        .map(DayStats::total_tokens)
        .fold(0i64, i64::saturating_add);

    // Days are newest first; a later day only replaces the pick when strictly busier.
    let most_active_day = days
        .iter()
        .fold(None::<&DayStats>, |best, day| match best {
            Some(best) if day.interactions <= best.interactions => Some(best),
            _ => Some(day),
        })
        .map(|day| day.date);

    let (avg_sessions_per_day, avg_interactions_per_day, avg_tokens_per_day) = if total_days > 0 {
        (
            round2(total_sessions as f64 / total_days as f64),
            round2(total_interactions as f64 / total_days as f64),
            (total_tokens as f64 / total_days as f64).round() as i64,
        )
    } else {
        (0.0, 0.0, 0)
    };

    DailySummary {
        total_days,
        total_sessions,
        total_tokens,
        avg_sessions_per_day,
        avg_interactions_per_day,
        avg_tokens_per_day,
        most_active_day,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
