//! Daily activity statistics

use ccstats::config::PROJECTS_GLOB;
use ccstats::daily::daily_stats;
use ccstats::relation::{JsonlSource, Relation};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;

mod common;
use common::{line, write_jsonl};

fn entry(timestamp: &str, kind: &str, session: &str, cwd: &str, input: i64) -> String {
    line(json!({
        "timestamp": timestamp,
        "type": kind,
        "sessionId": session,
        "cwd": cwd,
        "message": {"usage": {"input_tokens": input, "output_tokens": 1}}
    }))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_days_are_grouped_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    write_jsonl(
        temp_dir.path(),
        "projects/a/s.jsonl",
        &[
            entry("2025-01-14T09:00:00Z", "user", "s1", "/w/a", 0),
            entry("2025-01-14T09:00:05Z", "assistant", "s1", "/w/a", 100),
            entry("2025-01-15T08:00:00Z", "user", "s2", "/w/a", 0),
            entry("2025-01-15T18:30:00Z", "user", "s3", "/w/b", 0),
            entry("2025-01-15T18:30:02Z", "assistant", "s3", "/w/b", 40),
            // Outside the window.
            entry("2024-11-01T10:00:00Z", "user", "old", "/w/a", 0),
            line(json!({"type": "summary", "summary": "no timestamp"})),
        ],
    )
    .unwrap();

    let relation = Relation::build(&JsonlSource::new(temp_dir.path(), PROJECTS_GLOB)).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap();
    let report = daily_stats(&relation, 30, now);

    assert_eq!(report.window_days, 30);
    assert_eq!(report.days.len(), 2);

    let latest = &report.days[0];
    assert_eq!(latest.date, date(2025, 1, 15));
    assert_eq!(latest.sessions, 2);
    assert_eq!(latest.interactions, 2);
    assert_eq!(latest.active_projects, 2);
    assert_eq!(latest.input_tokens, 40);
    assert_eq!(latest.output_tokens, 3);
    assert_eq!(
        latest.first_activity,
        Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap()
    );
    assert_eq!(
        latest.last_activity,
        Utc.with_ymd_and_hms(2025, 1, 15, 18, 30, 2).unwrap()
    );

    let earlier = &report.days[1];
    assert_eq!(earlier.date, date(2025, 1, 14));
    assert_eq!(earlier.sessions, 1);
    assert_eq!(earlier.interactions, 1);
    assert_eq!(earlier.total_tokens(), 102);

    let summary = &report.summary;
    assert_eq!(summary.total_days, 2);
    assert_eq!(summary.total_sessions, 3);
    assert_eq!(summary.total_tokens, 145);
    assert_eq!(summary.avg_sessions_per_day, 1.5);
    assert_eq!(summary.avg_interactions_per_day, 1.5);
    assert_eq!(summary.avg_tokens_per_day, 73);
    assert_eq!(summary.most_active_day, Some(date(2025, 1, 15)));
}

#[test]
fn test_most_active_tie_keeps_most_recent_day() {
    let temp_dir = TempDir::new().unwrap();
    write_jsonl(
        temp_dir.path(),
        "projects/a/s.jsonl",
        &[
            entry("2025-01-13T10:00:00Z", "user", "s1", "/w/a", 0),
            entry("2025-01-14T10:00:00Z", "user", "s2", "/w/a", 0),
        ],
    )
    .unwrap();

    let relation = Relation::build(&JsonlSource::new(temp_dir.path(), PROJECTS_GLOB)).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap();
    let report = daily_stats(&relation, 7, now);

    assert_eq!(report.summary.most_active_day, Some(date(2025, 1, 14)));
}

#[test]
fn test_window_is_clamped() {
    let relation = Relation::default();
    let now = Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap();

    assert_eq!(daily_stats(&relation, 0, now).window_days, 1);
    assert_eq!(daily_stats(&relation, 5000, now).window_days, 365);
}
