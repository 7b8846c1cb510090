//! Pass-through hook event recorder.
//!
//! Reads one JSON object, appends a [`HookEvent`] line to the day's log file in
//! the hooks directory, then writes the original input bytes back out unchanged
//! so the recorder can sit inline in a hook pipeline.

use crate::error::{Result, StatsError};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One line of a hook log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookEvent {
    pub timestamp: DateTime<Local>,
    pub event_type: String,
    pub hook_data: Map<String, Value>,
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_data: Option<String>,
}

/// Guess the hook event type from the shape of its payload.
pub fn infer_event_type(hook_data: &Map<String, Value>) -> &'static str {
    if hook_data.contains_key("tool") {
        if hook_data.contains_key("result") {
            "PostToolUse"
        } else {
            "PreToolUse"
        }
    } else if hook_data.contains_key("notification") {
        "Notification"
    } else {
        "Unknown"
    }
}

#[derive(Debug, Clone)]
pub struct HookRecorder {
    hooks_dir: PathBuf,
    event_type: Option<String>,
}

impl HookRecorder {
    pub fn new(hooks_dir: impl Into<PathBuf>) -> Self {
        Self {
            hooks_dir: hooks_dir.into(),
            event_type: None,
        }
    }

    /// Use an explicit event type instead of inferring one. Empty values are ignored.
    pub fn with_event_type(mut self, event_type: Option<String>) -> Self {
        self.event_type = event_type.filter(|event_type| !event_type.is_empty());
        self
    }

    pub fn hooks_dir(&self) -> &Path {
        &self.hooks_dir
    }

    /// Log file for a calendar day: `hooks_YYYY-MM-DD.jsonl`.
    pub fn log_path_for(&self, date: NaiveDate) -> PathBuf {
        self.hooks_dir
            .join(format!("hooks_{}.jsonl", date.format("%Y-%m-%d")))
    }

    pub fn record<R: Read, W: Write>(&self, input: R, output: W) -> Result<HookEvent> {
        self.record_at(Local::now(), input, output)
    }

    pub fn record_at<R: Read, W: Write>(
        &self,
        now: DateTime<Local>,
        mut input: R,
        mut output: W,
    ) -> Result<HookEvent> {
        let mut raw = Vec::new();
        input.read_to_end(&mut raw)?;

        let hook_data = match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(StatsError::InvalidHookInput(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )))
            }
            Err(e) => {
                return Err(StatsError::InvalidHookInput(format!(
                    "error parsing JSON: {}",
                    e
                )))
            }
        };

        let event_type = self
            .event_type
            .clone()
            .unwrap_or_else(|| infer_event_type(&hook_data).to_string());

        let event = HookEvent {
            timestamp: now,
            event_type,
            hook_data,
            exit_code: 0,
            stdout_data: None,
            stderr_data: None,
        };

        self.append(&event, now.date_naive())?;

        output.write_all(&raw)?;
        output.flush()?;

        Ok(event)
    }

    fn append(&self, event: &HookEvent, date: NaiveDate) -> Result<()> {
        fs::create_dir_all(&self.hooks_dir)?;

        let path = self.log_path_for(date);
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(&line)?;

        debug!(file = %path.display(), event_type = %event.event_type, "Recorded hook event");
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
