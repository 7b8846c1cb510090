//! Schema-Unified Relation
//!
//! Claude Code log files drift in shape over time: fields appear, disappear, and
//! change type between versions. This module turns a set of such JSONL files into
//! one in-memory table whose schema is the union of every top-level field seen in
//! any file.
//!
//! ## Pipeline
//!
//! 1. **Discovery and parsing**: a [`RecordSource`] yields one [`SourceBatch`] per
//!    file, each holding that file's JSON object records.
//! 2. **Schema inference**: [`Relation::from_batches`] walks every record once and
//!    builds a [`Schema`] by name, in first-seen order.
//! 3. **Alignment**: each record is laid out against the unified schema; fields its
//!    file never had read as JSON `null`.
//!
//! Values keep their raw JSON form. Type coercion (string-encoded integers, nested
//! JSON held in strings) happens at aggregation time, see [`crate::models`].
//!
//! ## Failure policy
//!
//! - No matching files: empty relation, not an error.
//! - A file that cannot be opened or read: skipped whole, logged, counted.
//! - A line that is not a JSON object: skipped, logged, counted.
//! - An invalid glob pattern: [`StatsError::InvalidPattern`], nothing is read.

use crate::error::{Result, StatsError};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static NULL: Value = Value::Null;

/// Records parsed from one source file.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub path: PathBuf,
    pub records: Vec<Map<String, Value>>,
}

impl SourceBatch {
    pub fn new(path: impl Into<PathBuf>, records: Vec<Map<String, Value>>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }

    /// Every top-level field name present in at least one record of this file.
    pub fn fields(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .flat_map(|record| record.keys().cloned())
            .collect()
    }
}

/// Counters describing what the source read and what it had to skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub files_matched: usize,
    pub files_read: usize,
    pub files_skipped: usize,
    pub lines_skipped: usize,
}

/// Output of a [`RecordSource`].
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub batches: Vec<SourceBatch>,
    pub stats: IngestStats,
}

/// Something that can produce untyped records grouped by originating file.
pub trait RecordSource {
    fn read_batches(&self) -> Result<Ingested>;
}

/// Reads every file under `root` matching a glob (with `**` support) as newline-delimited JSON.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    root: PathBuf,
    pattern: String,
}

impl JsonlSource {
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            pattern: pattern.into(),
        }
    }

    /// The root is matched literally; only `pattern` carries glob syntax.
    fn full_pattern(&self) -> String {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        Path::new(&root)
            .join(&self.pattern)
            .to_string_lossy()
            .into_owned()
    }

    /// Parse one file. `Ok(None)` means the file had to be skipped.
    fn read_file(&self, path: &Path, stats: &mut IngestStats) -> Option<SourceBatch> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                return None;
            }
        };

        let reader = BufReader::new(file);
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    debug!(file = %path.display(), line = line_number, "Skipping non UTF-8 line");
                    skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(file = %path.display(), line = line_number, error = %e, "Read failed, skipping file");
                    return None;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Value>(line) {
                Ok(Value::Object(record)) => records.push(record),
                Ok(_) => {
                    debug!(file = %path.display(), line = line_number, "Skipping non-object JSON line");
                    skipped += 1;
                }
                Err(e) => {
                    debug!(file = %path.display(), line = line_number, error = %e, "Skipping malformed JSON line");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(
                file = %path.display(),
                lines_skipped = skipped,
                records = records.len(),
                "Parsed file with malformed lines"
            );
        }
        stats.lines_skipped += skipped;

        Some(SourceBatch::new(path, records))
    }
}

impl RecordSource for JsonlSource {
    fn read_batches(&self) -> Result<Ingested> {
        let pattern = self.full_pattern();
        let paths = glob::glob(&pattern).map_err(|source| StatsError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

        let mut ingested = Ingested::default();

        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(path = %e.path().display(), error = %e.error(), "Skipping inaccessible path");
                    ingested.stats.files_matched += 1;
                    ingested.stats.files_skipped += 1;
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }
            ingested.stats.files_matched += 1;

            match self.read_file(&path, &mut ingested.stats) {
                Some(batch) => {
                    ingested.stats.files_read += 1;
                    ingested.batches.push(batch);
                }
                None => ingested.stats.files_skipped += 1,
            }
        }

        debug!(pattern = %pattern, stats = ?ingested.stats, "Finished reading JSONL files");
        Ok(ingested)
    }
}

/// A source backed by batches already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    batches: Vec<SourceBatch>,
}

impl MemorySource {
    pub fn new(batches: Vec<SourceBatch>) -> Self {
        Self { batches }
    }
}

impl RecordSource for MemorySource {
    fn read_batches(&self) -> Result<Ingested> {
        Ok(Ingested {
            stats: IngestStats {
                files_matched: self.batches.len(),
                files_read: self.batches.len(),
                ..IngestStats::default()
            },
            batches: self.batches.clone(),
        })
    }
}

/// Ordered set of field names.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    fn insert(&mut self, name: &str) {
        if !self.index.contains_key(name) {
            self.index.insert(name.to_string(), self.fields.len());
            self.fields.push(name.to_string());
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Row {
    values: Vec<Value>,
    source: usize,
}

/// The union-schema table every aggregate runs over.
#[derive(Debug, Clone, Default)]
pub struct Relation {
    schema: Schema,
    rows: Vec<Row>,
    sources: Vec<PathBuf>,
    stats: IngestStats,
}

impl Relation {
    /// Read a source and unify its batches.
    pub fn build(source: &dyn RecordSource) -> Result<Self> {
        let ingested = source.read_batches()?;
        let relation = Self::from_batches(ingested.batches, ingested.stats);

        info!(
            rows = relation.len(),
            fields = relation.schema.len(),
            files_read = relation.stats.files_read,
            files_skipped = relation.stats.files_skipped,
            lines_skipped = relation.stats.lines_skipped,
            "Built unified relation"
        );

        Ok(relation)
    }

    /// Union-by-name merge of per-file batches.
    pub fn from_batches(batches: Vec<SourceBatch>, stats: IngestStats) -> Self {
        let mut schema = Schema::default();
        for record in batches.iter().flat_map(|batch| batch.records.iter()) {
            for name in record.keys() {
                schema.insert(name);
            }
        }

        let width = schema.len();
        let mut rows = Vec::new();
        let mut sources = Vec::with_capacity(batches.len());

        for (source, batch) in batches.into_iter().enumerate() {
            sources.push(batch.path);
            for record in batch.records {
                let mut values = vec![Value::Null; width];
                for (name, value) in record {
                    if let Some(position) = schema.position(&name) {
                        values[position] = value;
                    }
                }
                rows.push(Row { values, source });
            }
        }

        Self {
            schema,
            rows,
            sources,
            stats,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Files that contributed batches, in read order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(move |row| Record {
            relation: self,
            row,
        })
    }
}

/// Read-only view of one row against the unified schema.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    relation: &'a Relation,
    row: &'a Row,
}

impl<'a> Record<'a> {
    /// Value of `field`, or `null` when no file carried it or this row lacks it.
    pub fn get(&self, field: &str) -> &'a Value {
        self.relation
            .schema
            .position(field)
            .and_then(|position| self.row.values.get(position))
            .unwrap_or(&NULL)
    }

    /// Path of the file this row came from.
    pub fn source(&self) -> &'a Path {
        &self.relation.sources[self.row.source]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_schema_orders_fields_by_first_file_seen() {
        let batches = vec![
            SourceBatch::new("a.jsonl", vec![record(json!({"z": 1, "m": 2}))]),
            SourceBatch::new("b.jsonl", vec![record(json!({"a": 3, "m": 4}))]),
        ];
        let relation = Relation::from_batches(batches, IngestStats::default());

        // Within one record keys come in map order; across files, first seen wins.
        assert_eq!(relation.schema().fields(), &["m", "z", "a"]);
    }

    #[test]
    fn test_missing_fields_read_as_null() {
        let batches = vec![
            SourceBatch::new("a.jsonl", vec![record(json!({"cwd": "/p"}))]),
            SourceBatch::new("b.jsonl", vec![record(json!({"model": "m"}))]),
        ];
        let relation = Relation::from_batches(batches, IngestStats::default());
        let rows: Vec<_> = relation.records().collect();

        assert_eq!(rows[0].get("model"), &Value::Null);
        assert_eq!(rows[1].get("cwd"), &Value::Null);
        assert_eq!(rows[1].get("never_seen"), &Value::Null);
        assert_eq!(rows[1].source(), Path::new("b.jsonl"));
    }

    #[test]
    fn test_explicit_null_is_kept_as_null() {
        let batches = vec![SourceBatch::new(
            "a.jsonl",
            vec![record(json!({"cwd": null, "x": 1}))],
        )];
        let relation = Relation::from_batches(batches, IngestStats::default());
        assert!(relation.schema().contains("cwd"));
        assert_eq!(relation.records().next().unwrap().get("cwd"), &Value::Null);
    }

    #[test]
    fn test_build_from_memory_source() {
        let source = MemorySource::new(vec![
            SourceBatch::new("a.jsonl", vec![record(json!({"x": 1})), record(json!({"x": 2}))]),
            SourceBatch::new("b.jsonl", Vec::new()),
        ]);
        let relation = Relation::build(&source).unwrap();

        assert_eq!(relation.len(), 2);
        assert_eq!(relation.sources().len(), 2);
        assert_eq!(relation.stats().files_read, 2);
        assert_eq!(relation.stats().lines_skipped, 0);
    }
}
