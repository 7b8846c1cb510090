#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `lines` as a JSONL file at `dir/relative`, creating parent directories.
pub fn write_jsonl(dir: &Path, relative: &str, lines: &[String]) -> Result<PathBuf> {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content)?;
    Ok(path)
}

/// One assistant usage line in the shape Claude Code writes.
pub fn usage_line(model: Option<&str>, input: i64, output: i64, cwd: Option<&str>) -> String {
    let mut message = json!({
        "role": "assistant",
        "usage": {
            "input_tokens": input,
            "output_tokens": output,
            "cache_creation_input_tokens": 0,
            "cache_read_input_tokens": 0
        }
    });
    if let Some(model) = model {
        message["model"] = json!(model);
    }

    let mut line = json!({
        "type": "assistant",
        "timestamp": "2025-01-15T10:30:00Z",
        "sessionId": "session-1",
        "message": message
    });
    if let Some(cwd) = cwd {
        line["cwd"] = json!(cwd);
    }
    line.to_string()
}

pub fn line(value: Value) -> String {
    value.to_string()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
