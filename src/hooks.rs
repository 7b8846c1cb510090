//! Hook event statistics.
//!
//! Hook logs are optional. [`HookAggregator::probe`] decides whether there is
//! anything to report: a missing directory, a relation that fails to build, a
//! relation without rows, or one whose rows never carry an `event_type` all mean
//! "no hooks data" and are never surfaced to the user.

use crate::config::HOOKS_GLOB;
use crate::error::{Result, StatsError};
use crate::models::{extract_string, parse_nested_json, EventTypeCount, HookStats, ToolCount};
use crate::relation::{JsonlSource, Relation};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub const EVENT_TYPE_FIELD: &str = "event_type";
pub const HOOK_DATA_FIELD: &str = "hook_data";

/// Event types whose `hook_data` describes a tool call.
pub const TOOL_EVENT_TYPES: [&str; 2] = ["PreToolUse", "PostToolUse"];

const TOOL_USAGE_STEP: &str = "tool usage";

pub struct HookAggregator<'a> {
    relation: &'a Relation,
}

impl<'a> HookAggregator<'a> {
    /// Load the hook relation if there is at least one hook event to report on.
    pub fn probe(hooks_dir: &Path) -> Option<Relation> {
        if !hooks_dir.is_dir() {
            debug!(dir = %hooks_dir.display(), "No hooks directory");
            return None;
        }

        let source = JsonlSource::new(hooks_dir, HOOKS_GLOB);
        match Relation::build(&source) {
            Ok(relation) if relation.is_empty() => {
                debug!(dir = %hooks_dir.display(), "Hooks directory has no events");
                None
            }
            Ok(relation) if !relation.schema().contains(EVENT_TYPE_FIELD) => {
                debug!(dir = %hooks_dir.display(), "Hook logs have no event_type field");
                None
            }
            Ok(relation) => Some(relation),
            Err(e) => {
                debug!(dir = %hooks_dir.display(), error = %e, "Could not read hook logs");
                None
            }
        }
    }

    pub fn new(relation: &'a Relation) -> Self {
        Self { relation }
    }

    pub fn total_events(&self) -> u64 {
        self.relation.len() as u64
    }

    /// Event counts per `event_type`, most frequent first.
    ///
    /// Rows without an event type cannot be reported and are skipped with a warning.
    pub fn events_by_type(&self) -> Vec<EventTypeCount> {
        let mut groups: Vec<(Option<String>, u64)> = Vec::new();
        let mut positions: HashMap<Option<String>, usize> = HashMap::new();

        for record in self.relation.records() {
            let event_type = extract_string(record.get(EVENT_TYPE_FIELD));
            match positions.get(&event_type) {
                Some(&position) => groups[position].1 += 1,
                None => {
                    positions.insert(event_type.clone(), groups.len());
                    groups.push((event_type, 1));
                }
            }
        }

        groups.sort_by(|a, b| b.1.cmp(&a.1));

        groups
            .into_iter()
            .filter_map(|(event_type, count)| match event_type {
                Some(event_type) => Some(EventTypeCount { event_type, count }),
                None => {
                    warn!(count, "Skipping hook events without an event_type");
                    None
                }
            })
            .collect()
    }

    /// Most used tools across tool events, by `hook_data.tool.tool`.
    pub fn top_tools(&self, limit: usize) -> Result<Vec<ToolCount>> {
        let mut tools: Vec<ToolCount> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in self.relation.records() {
            let is_tool_event = extract_string(record.get(EVENT_TYPE_FIELD))
                .is_some_and(|event_type| TOOL_EVENT_TYPES.contains(&event_type.as_str()));
            if !is_tool_event {
                continue;
            }

            let hook_data = parse_nested_json(record.get(HOOK_DATA_FIELD)).map_err(|e| {
                StatsError::query(
                    TOOL_USAGE_STEP,
                    format!("hook_data is not valid JSON: {} ({})", e, record.source().display()),
                )
            })?;
            let tool = hook_data
                .as_deref()
                .and_then(|data| data.get("tool"))
                .and_then(|tool| tool.get("tool"))
                .and_then(extract_string);

            let Some(tool) = tool else {
                continue;
            };
            match positions.get(&tool) {
                Some(&position) => tools[position].count += 1,
                None => {
                    positions.insert(tool.clone(), tools.len());
                    tools.push(ToolCount { tool, count: 1 });
                }
            }
        }

        tools.sort_by(|a, b| b.count.cmp(&a.count));
        tools.truncate(limit);
        Ok(tools)
    }

    /// All hook statistics; a failing section is left out rather than reported.
    pub fn stats(&self, tool_limit: usize) -> HookStats {
        let top_tools = match self.top_tools(tool_limit) {
            Ok(tools) => Some(tools),
            Err(e) => {
                debug!(error = %e, "Tool usage unavailable");
                None
            }
        };

        HookStats {
            total: self.total_events(),
            by_type: Some(self.events_by_type()),
            top_tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::{IngestStats, SourceBatch};
    use serde_json::{json, Value};

    fn relation(rows: Vec<Value>) -> Relation {
        let records = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        Relation::from_batches(
            vec![SourceBatch::new("hooks_2025-01-01.jsonl", records)],
            IngestStats::default(),
        )
    }

    #[test]
    fn test_tool_counts_only_tool_events() {
        let relation = relation(vec![
            json!({"event_type": "PreToolUse", "hook_data": {"tool": {"tool": "Bash"}}}),
            json!({"event_type": "PostToolUse", "hook_data": {"tool": {"tool": "Bash"}}}),
            json!({"event_type": "PreToolUse", "hook_data": {"tool": {"tool": "Edit"}}}),
            json!({"event_type": "Notification", "hook_data": {"tool": {"tool": "Bash"}}}),
            json!({"event_type": "PreToolUse", "hook_data": {"tool": "Read"}}),
        ]);
        let tools = HookAggregator::new(&relation).top_tools(10).unwrap();

        assert_eq!(
            tools,
            vec![
                ToolCount { tool: "Bash".to_string(), count: 2 },
                ToolCount { tool: "Edit".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_bad_hook_data_drops_only_tool_section() {
        let relation = relation(vec![
            json!({"event_type": "PreToolUse", "hook_data": "{not json"}),
        ]);
        let stats = HookAggregator::new(&relation).stats(10);

        assert_eq!(stats.total, 1);
        assert!(stats.top_tools.is_none());
        assert_eq!(stats.by_type.unwrap()[0].event_type, "PreToolUse");
    }
}
