//! Test builders — ergonomic constructors for log lines, sources and
//! timestamps.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::TimeZone;
use tracemix_core::{Source, Timestamp};

/// Day every builder writes its stamps on.
#[allow(dead_code)]
pub const DAY: &str = "20220128";

/// `HHMMSS.mmm` on [`DAY`] in the log line format.
#[allow(dead_code)]
pub fn stamp(h: u32, m: u32, s: u32, ms: u32) -> String {
    format!("{DAY}/{h:02}{m:02}{s:02}.{ms:03}")
}

/// The local instant a [`stamp`] with the same arguments parses to.
#[allow(dead_code)]
pub fn at(h: u32, m: u32, s: u32, ms: u32) -> Timestamp {
    chrono::Local
        .with_ymd_and_hms(2022, 1, 28, h, m, s)
        .earliest()
        .expect("valid local time")
        + chrono::Duration::milliseconds(ms as i64)
}

/// Fluent builder for the lines of one log source.
///
/// # Example
///
/// ```rust
/// let lines = LogBuilder::new()
///     .record(stamp(10, 0, 0, 0), "request started")
///     .continuation("  header: x")
///     .record(stamp(10, 0, 1, 0), "request done")
///     .build();
/// ```
#[allow(dead_code)]
#[derive(Debug, Default, Clone)]
pub struct LogBuilder {
    lines: Vec<String>,
}

#[allow(dead_code)]
impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A boundary line: `<stamp> <message>`.
    pub fn record(mut self, stamp: impl AsRef<str>, message: &str) -> Self {
        self.lines.push(format!("{} {}", stamp.as_ref(), message));
        self
    }

    /// A line without a timestamp, appended to the open record.
    pub fn continuation(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// One record per millisecond offset from 10:00:00.000 on [`DAY`].
    pub fn ticks(mut self, prefix: &str, offsets_ms: &[u32]) -> Self {
        for (i, offset) in offsets_ms.iter().enumerate() {
            let ms = *offset;
            let line = stamp(10, ms / 60_000 % 60, ms / 1000 % 60, ms % 1000);
            self.lines.push(format!("{line} {prefix}{i}"));
        }
        self
    }

    pub fn build(self) -> Vec<String> {
        self.lines
    }

    pub fn source(self, id: &str) -> Source {
        Source::from_lines(id, self.lines)
    }

    /// The lines joined with `\n`, terminated, ready to write to a file.
    pub fn file_contents(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}
