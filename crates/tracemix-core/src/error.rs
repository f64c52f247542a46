//! Error types shared by the pipeline stages.

use crate::types::SourceId;

/// A log line timestamp that does not follow `YYYYMMDD/HHMMSS.mmm`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid log timestamp {text:?}: {reason}")]
pub struct TimestampParseError {
    pub text: String,
    pub reason: String,
}

/// A window bound that matches none of the accepted formats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowParseError {
    #[error("unrecognised time {0:?} (expected YYYY.MM.DD HH:MM[:SS], HH:MM[:SS], now or n)")]
    Unrecognised(String),

    #[error("time {0:?} does not exist in the local time zone")]
    NonexistentLocalTime(String),
}

/// Fatal pipeline failures. Any of these aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to read source {source_id}")]
    Io {
        source_id: SourceId,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid time window")]
    Window(#[from] WindowParseError),

    #[error("pipeline stage panicked")]
    Task(#[from] tokio::task::JoinError),
}

/// Failures writing merged records to a consumer.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write record")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record")]
    Encode(#[from] serde_json::Error),
}
