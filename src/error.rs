//! Error types for ingestion, aggregation and hook recording.

use thiserror::Error;

/// Errors raised while building relations, computing aggregates or recording hook events.
#[derive(Error, Debug)]
pub enum StatsError {
    /// The user's home directory could not be determined
    #[error("could not determine home directory")]
    HomeDirUnavailable,

    /// Glob pattern rejected before any file was read
    #[error("invalid glob pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The unified relation could not be constructed
    #[error("relation build failed: {0}")]
    RelationBuild(String),

    /// An aggregate computation failed against a valid relation
    #[error("{step} failed: {message}")]
    Query {
        /// Name of the aggregate that failed
        step: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// Recorder input was not a single JSON object
    #[error("invalid hook input: {0}")]
    InvalidHookInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StatsError {
    pub(crate) fn query(step: &'static str, message: impl Into<String>) -> Self {
        StatsError::Query {
            step,
            message: message.into(),
        }
    }

    /// Whether the failure happened while building a relation rather than querying one.
    pub fn is_relation_build(&self) -> bool {
        matches!(
            self,
            StatsError::InvalidPattern { .. } | StatsError::RelationBuild(_)
        )
    }
}

/// Result type for statistics operations.
pub type Result<T> = std::result::Result<T, StatsError>;
