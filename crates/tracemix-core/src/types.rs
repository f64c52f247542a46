//! Core types for tracemix-core.
//!
//! This module defines the data structures that flow between the pipeline
//! stages: raw [`Line`]s, reconstructed [`Record`]s, the [`SourceId`] that
//! tags both, and the [`TimeWindow`] applied to the merged stream.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

/// An instant with millisecond precision, interpreted in the local time zone.
pub type Timestamp = chrono::DateTime<chrono::Local>;

/// Identifier of one input source, usually the path it was opened from.
///
/// Cloning is cheap; every [`Line`] and [`Record`] carries one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(Arc<str>);

impl SourceId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component, or the full name when it has none.
    pub fn base_name(&self) -> &str {
        Path::new(self.as_str())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.as_str())
    }

    /// How this source is shown next to its records.
    pub fn label(&self, style: LabelStyle) -> &str {
        match style {
            LabelStyle::Path => self.as_str(),
            LabelStyle::Basename => self.base_name(),
            LabelStyle::None => "",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SourceId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Provenance shown in front of every rendered record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// The source identifier as given.
    #[default]
    Path,
    /// Only the final path component.
    Basename,
    /// No provenance at all.
    None,
}

impl fmt::Display for LabelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelStyle::Path => write!(f, "path"),
            LabelStyle::Basename => write!(f, "basename"),
            LabelStyle::None => write!(f, "none"),
        }
    }
}

/// One raw input line, stripped of its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub source: SourceId,
    pub text: String,
}

/// A logical, possibly multi-line log entry with one resolved timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: Timestamp,
    pub source: SourceId,
    /// Content lines in input order; the first one carries the timestamp.
    pub content: Vec<String>,
}

impl Record {
    pub fn new(timestamp: Timestamp, source: SourceId, first_line: String) -> Self {
        Self {
            timestamp,
            source,
            content: vec![first_line],
        }
    }

    /// Content lines joined with line breaks.
    pub fn text(&self) -> String {
        self.content.join("\n")
    }
}

/// Inclusive time range applied to the merged stream. An absent bound does
/// not constrain that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

/// Where a timestamp falls relative to a [`TimeWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    Before,
    Inside,
    After,
}

impl TimeWindow {
    /// A window that admits everything.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn position(&self, ts: &Timestamp) -> WindowPosition {
        if self.start.is_some_and(|start| *ts < start) {
            WindowPosition::Before
        } else if self.end.is_some_and(|end| *ts > end) {
            WindowPosition::After
        } else {
            WindowPosition::Inside
        }
    }

    pub fn contains(&self, ts: &Timestamp) -> bool {
        self.position(ts) == WindowPosition::Inside
    }
}

/// Per-source counters reported by the record reconstructor when its source
/// is exhausted or the pipeline stops pulling from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub source: SourceId,
    /// Lines received from the line source.
    pub lines: usize,
    /// Records emitted towards the merge.
    pub records: usize,
    /// Lines discarded because no record was open to absorb them.
    pub skipped: usize,
    /// Boundary lines whose embedded timestamp failed to parse.
    pub malformed: usize,
}

impl SourceStats {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            lines: 0,
            records: 0,
            skipped: 0,
            malformed: 0,
        }
    }
}

impl fmt::Display for SourceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} lines read, {} records",
            self.source, self.lines, self.records
        )?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if self.malformed > 0 {
            write!(f, ", {} malformed", self.malformed)?;
        }
        Ok(())
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeReport {
    /// One entry per source, in source order.
    pub sources: Vec<SourceStats>,
    /// Records the scheduler handed to the window filter.
    pub merged: usize,
    /// Records delivered to the consumer.
    pub emitted: usize,
    /// Records dropped for falling before the window start.
    pub before_window: usize,
    /// Records dropped for falling after the window end.
    pub after_window: usize,
    /// The filter stopped the pipeline at the first record past the end.
    pub stopped_at_end: bool,
}
