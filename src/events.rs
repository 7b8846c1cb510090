//! Recent usage events timeline.
//!
//! Rows of the usage relation whose `timestamp` falls within a trailing window,
//! newest first. Token counts are read leniently, like the daily report.

use crate::models::{extract_string, project_name, UsageRecord, UsageTokens};
use crate::relation::Relation;
use crate::timestamp_parser::TimestampParser;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const TYPE_FIELD: &str = "type";

/// One usage log entry as shown in the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: Option<String>,
    pub model: Option<String>,
    pub tokens: UsageTokens,
    pub project_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventsReport {
    pub window_minutes: u32,
    pub limit: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Newest first, at most `limit` entries
    pub events: Vec<RecentEvent>,
}

/// Events from the last `minutes` minutes before `now`, newest first, capped at `limit`.
///
/// Events with equal timestamps keep relation order.
pub fn recent_events(
    relation: &Relation,
    minutes: u32,
    limit: usize,
    now: DateTime<Utc>,
) -> EventsReport {
    let start = now - Duration::minutes(i64::from(minutes));

    let mut events: Vec<RecentEvent> = relation
        .records()
        .filter_map(|record| {
            let timestamp = TimestampParser::parse_value(record.get("timestamp"))?;
            if timestamp < start {
                return None;
            }

            let usage = UsageRecord::from_record_lenient(&record);
            Some(RecentEvent {
                timestamp,
                event_type: extract_string(record.get(TYPE_FIELD)),
                model: usage.model,
                tokens: usage.tokens,
                project_name: usage.cwd.as_deref().map(project_name),
            })
        })
        .collect();

    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events.truncate(limit);

    EventsReport {
        window_minutes: minutes,
        limit,
        start,
        end: now,
        events,
    }
}
