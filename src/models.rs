//! Core Data Models
//!
//! Typed views over rows of a [`Relation`](crate::relation::Relation) and the
//! result types the aggregators produce.
//!
//! ## Data Flow
//!
//! 1. **Raw rows**: [`Record`] - one unified row, raw JSON per field
//! 2. **Typed view**: [`UsageRecord`] - token counts, model and `cwd` pulled out of a row
//! 3. **Results**: [`TokenTotals`], [`ProjectCost`], [`HookStats`]
//!
//! ## Coercion rules
//!
//! The `message` field may be a JSON object or a string holding JSON text. Token
//! counts may be integers, floats, or strings holding either. A value that cannot
//! be read as an integer is an error for the aggregate being computed, not for
//! ingestion.

use crate::relation::Record;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;

pub const MESSAGE_FIELD: &str = "message";
pub const CWD_FIELD: &str = "cwd";
pub const MODEL_KEY: &str = "model";
pub const USAGE_KEY: &str = "usage";

/// The four token counters found under `message.usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    Input,
    Output,
    CacheRead,
    CacheCreation,
}

impl TokenField {
    pub const ALL: [TokenField; 4] = [
        TokenField::Input,
        TokenField::Output,
        TokenField::CacheRead,
        TokenField::CacheCreation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TokenField::Input => "input_tokens",
            TokenField::Output => "output_tokens",
            TokenField::CacheRead => "cache_read_input_tokens",
            TokenField::CacheCreation => "cache_creation_input_tokens",
        }
    }
}

/// Token counts of one row. `None` means the value was absent or `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageTokens {
    pub input: Option<i64>,
    pub output: Option<i64>,
    pub cache_read: Option<i64>,
    pub cache_creation: Option<i64>,
}

impl UsageTokens {
    pub fn get(&self, field: TokenField) -> Option<i64> {
        match field {
            TokenField::Input => self.input,
            TokenField::Output => self.output,
            TokenField::CacheRead => self.cache_read,
            TokenField::CacheCreation => self.cache_creation,
        }
    }

    fn slot(&mut self, field: TokenField) -> &mut Option<i64> {
        match field {
            TokenField::Input => &mut self.input,
            TokenField::Output => &mut self.output,
            TokenField::CacheRead => &mut self.cache_read,
            TokenField::CacheCreation => &mut self.cache_creation,
        }
    }

    /// Sum of the four counters with missing ones read as zero.
    pub fn coalesced_total(&self) -> i64 {
        TokenField::ALL
            .iter()
            .map(|field| self.get(*field).unwrap_or(0))
            .fold(0i64, i64::saturating_add)
    }
}

/// What the usage aggregates need from one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageRecord {
    pub tokens: UsageTokens,
    pub model: Option<String>,
    pub cwd: Option<String>,
}

impl UsageRecord {
    /// Strict extraction: malformed `message` JSON or a non-numeric token value is an error.
    pub fn from_record(record: &Record<'_>) -> Result<Self, String> {
        let message = parse_nested_json(record.get(MESSAGE_FIELD))
            .map_err(|e| format!("message is not valid JSON: {}", e))?;

        let mut tokens = UsageTokens::default();
        let mut model = None;

        if let Some(message) = message.as_deref() {
            let usage = message.get(USAGE_KEY);
            for field in TokenField::ALL {
                let value = usage.and_then(|usage| usage.get(field.key()));
                *tokens.slot(field) = match value {
                    Some(value) => coerce_integer(value)
                        .map_err(|e| format!("usage.{}: {}", field.key(), e))?,
                    None => None,
                };
            }
            model = message.get(MODEL_KEY).and_then(extract_string);
        }

        Ok(Self {
            tokens,
            model,
            cwd: extract_string(record.get(CWD_FIELD)),
        })
    }

    /// Lenient extraction: anything unreadable counts as absent.
    pub fn from_record_lenient(record: &Record<'_>) -> Self {
        let message = parse_nested_json(record.get(MESSAGE_FIELD)).unwrap_or(None);

        let mut tokens = UsageTokens::default();
        let mut model = None;

        if let Some(message) = message.as_deref() {
            let usage = message.get(USAGE_KEY);
            for field in TokenField::ALL {
                *tokens.slot(field) = usage
                    .and_then(|usage| usage.get(field.key()))
                    .and_then(|value| coerce_integer(value).ok().flatten());
            }
            model = message.get(MODEL_KEY).and_then(extract_string);
        }

        Self {
            tokens,
            model,
            cwd: extract_string(record.get(CWD_FIELD)),
        }
    }
}

/// Resolve a field that holds JSON either directly or as JSON text.
///
/// `Ok(None)` for `null`; an error when a string does not parse.
pub fn parse_nested_json(value: &Value) -> Result<Option<Cow<'_, Value>>, serde_json::Error> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => {
            let parsed: Value = serde_json::from_str(text)?;
            if parsed.is_null() {
                Ok(None)
            } else {
                Ok(Some(Cow::Owned(parsed)))
            }
        }
        other => Ok(Some(Cow::Borrowed(other))),
    }
}

/// Text form of a scalar: strings as-is, `null` as `None`, anything else as its JSON text.
pub fn extract_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Integer form of a token count.
///
/// Floats (and strings holding them) are rounded half away from zero.
pub fn coerce_integer(value: &Value) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(number) => {
            if let Some(n) = number.as_i64() {
                Ok(Some(n))
            } else {
                number
                    .as_f64()
                    .and_then(round_to_i64)
                    .map(Some)
                    .ok_or_else(|| format!("{} is out of integer range", number))
            }
        }
        Value::String(text) => {
            let text = text.trim();
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Some(n));
            }
            text.parse::<f64>()
                .ok()
                .and_then(round_to_i64)
                .map(Some)
                .ok_or_else(|| format!("could not convert string '{}' to integer", text))
        }
        other => Err(format!("could not convert {} to integer", other)),
    }
}

fn round_to_i64(value: f64) -> Option<i64> {
    let rounded = value.round();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Final path segment of a working directory, used as the project label.
pub fn project_name(cwd: &str) -> String {
    let is_separator = |c: char| c == '/' || c == '\\';

    if cwd.is_empty() {
        return ".".to_string();
    }
    let trimmed = cwd.trim_end_matches(is_separator);
    if trimmed.is_empty() {
        return cwd[..1].to_string();
    }
    match trimmed.rfind(is_separator) {
        Some(position) => trimmed[position + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// Global token sums. A field is `None` when no row carried a value for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenTotals {
    pub input: Option<i64>,
    pub output: Option<i64>,
    pub cache_read: Option<i64>,
    pub cache_creation: Option<i64>,
    /// Row-wise coalesced sum; `None` only for an empty relation.
    pub grand_total: Option<i64>,
}

/// Cost attributed to one working directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCost {
    pub cwd: String,
    pub project_name: String,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventTypeCount {
    pub event_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCount {
    pub tool: String,
    pub count: u64,
}

/// Hook statistics. A section is `None` when its computation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookStats {
    pub total: u64,
    pub by_type: Option<Vec<EventTypeCount>>,
    pub top_tools: Option<Vec<ToolCount>>,
}
