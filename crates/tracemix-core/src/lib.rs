//! tracemix-core — streaming merge of time-ordered log files.
//!
//! This crate exposes each pipeline stage as a public module, plus the
//! shared types that flow between them.
//!
//! # Architecture
//!
//! ```text
//! Source ──► Reconstructor ──┐
//! Source ──► Reconstructor ──┼──► MergeScheduler ──► WindowFilter ──► Export
//! Source ──► Reconstructor ──┘
//! ```
//!
//! All inter-stage communication uses bounded `tokio` queues (see [`queue`]);
//! every stage runs as its own task. The [`timestamp`] resolver is shared by
//! the reconstructors and by window setup.

pub mod config;
pub mod error;
pub mod export;
pub mod merge;
pub mod pipeline;
pub mod queue;
pub mod reconstruct;
pub mod source;
pub mod timestamp;
pub mod types;
pub mod window;

pub use error::{ExportError, MergeError, TimestampParseError, WindowParseError};
pub use pipeline::{MergedStream, Pipeline, PipelineOptions};
pub use source::Source;
pub use types::{Line, MergeReport, Record, SourceId, SourceStats, TimeWindow, Timestamp};
