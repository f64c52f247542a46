//! Timestamp resolver — strict log-line timestamps and flexible window bounds.
//!
//! Log lines carry `YYYYMMDD/HHMMSS.mmm` in the local time zone, optionally
//! preceded by one token (`host1 20220128/233741.111 ...`). Window bounds are
//! typed by people, so they accept a handful of looser shapes and are resolved
//! against a reference "now":
//!
//! | Input                 | Meaning                                   |
//! |-----------------------|-------------------------------------------|
//! | `2022.01.28 23:50:10` | absolute, second resolution               |
//! | `2022.01.28 23:50`    | absolute, minute resolution               |
//! | `23:50:10`            | today at that time, second resolution     |
//! | `23:50`               | today at that time, minute resolution     |
//! | `now`, `n`            | the reference instant                     |
//!
//! A bare time later than "now" means yesterday. End bounds are widened to
//! the last millisecond of their resolution.

use chrono::{DurationRound, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{TimestampParseError, WindowParseError};
use crate::types::{TimeWindow, Timestamp};

/// Start-of-record pattern. The first alternative wins when a line starts
/// with a timestamp; the second admits a single leading token.
static RECORD_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+/\d+\.\d+)|\S+\s+(\d+/\d+\.\d+))(?:\s|$)")
        .expect("record prefix pattern must compile")
});

static LOG_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})/(\d{2})(\d{2})(\d{2})\.(\d{3})$")
        .expect("log timestamp pattern must compile")
});

const ABSOLUTE_SECONDS: &str = "%Y.%m.%d %H:%M:%S";
const ABSOLUTE_MINUTES: &str = "%Y.%m.%d %H:%M";
const BARE_SECONDS: &str = "%H:%M:%S";
const BARE_MINUTES: &str = "%H:%M";

// ---------------------------------------------------------------------------
// Log line timestamps
// ---------------------------------------------------------------------------

/// Return the timestamp text of a line that starts a record, or `None` for a
/// continuation line.
pub fn record_prefix(line: &str) -> Option<&str> {
    let caps = RECORD_PREFIX.captures(line)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Parse `YYYYMMDD/HHMMSS.mmm` as a local instant.
pub fn parse_log_timestamp(text: &str) -> Result<Timestamp, TimestampParseError> {
    let fail = |reason: &str| TimestampParseError {
        text: text.to_string(),
        reason: reason.to_string(),
    };

    let caps = LOG_TIMESTAMP
        .captures(text)
        .ok_or_else(|| fail("expected YYYYMMDD/HHMMSS.mmm"))?;
    let field = |i: usize| -> u32 { caps[i].parse().unwrap_or(u32::MAX) };

    let date = NaiveDate::from_ymd_opt(field(1) as i32, field(2), field(3))
        .ok_or_else(|| fail("date out of range"))?;
    let time = NaiveTime::from_hms_milli_opt(field(4), field(5), field(6), field(7))
        .ok_or_else(|| fail("time out of range"))?;

    local_instant(date.and_time(time)).ok_or_else(|| fail("not a valid local time"))
}

// ---------------------------------------------------------------------------
// Window bounds
// ---------------------------------------------------------------------------

/// Finest unit given explicitly in a window bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Minute,
    Second,
    Millisecond,
}

/// A window bound after parsing and rollover correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    pub instant: Timestamp,
    pub precision: Precision,
}

impl ResolvedTime {
    /// The last millisecond covered by this bound's precision.
    pub fn closed_end(self) -> Timestamp {
        let widen = match self.precision {
            Precision::Minute => chrono::Duration::milliseconds(59_999),
            Precision::Second => chrono::Duration::milliseconds(999),
            Precision::Millisecond => chrono::Duration::zero(),
        };
        self.instant + widen
    }
}

/// The current local instant, truncated to milliseconds.
pub fn now() -> Timestamp {
    let now = chrono::Local::now();
    now.duration_trunc(chrono::Duration::milliseconds(1))
        .unwrap_or(now)
}

/// Parse one window bound. Empty input means "unbounded" and yields `None`.
pub fn parse_window_time(
    text: &str,
    now: Timestamp,
) -> Result<Option<ResolvedTime>, WindowParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if text.eq_ignore_ascii_case("now") || text.eq_ignore_ascii_case("n") {
        return Ok(Some(ResolvedTime {
            instant: now,
            precision: Precision::Millisecond,
        }));
    }

    if let Some(resolved) = parse_absolute(text)? {
        return Ok(Some(resolved));
    }

    for (format, precision) in [
        (BARE_SECONDS, Precision::Second),
        (BARE_MINUTES, Precision::Minute),
    ] {
        let Ok(time) = NaiveTime::parse_from_str(text, format) else {
            continue;
        };
        let mut instant = local_instant(now.date_naive().and_time(time))
            .ok_or_else(|| WindowParseError::NonexistentLocalTime(text.to_string()))?;
        if instant > now {
            instant -= chrono::Duration::hours(24);
        }
        return Ok(Some(ResolvedTime { instant, precision }));
    }

    Err(WindowParseError::Unrecognised(text.to_string()))
}

/// Parse a fixed "current time" override. Only absolute dates are accepted,
/// since a bare time would itself need a reference day.
pub fn parse_now_override(text: &str) -> Result<Timestamp, WindowParseError> {
    let text = text.trim();
    parse_absolute(text)?
        .map(|resolved| resolved.instant)
        .ok_or_else(|| WindowParseError::Unrecognised(text.to_string()))
}

/// Resolve both bounds against `now` and apply end closure and the
/// start-before-end correction.
pub fn resolve_window(
    start: &str,
    end: &str,
    now: Timestamp,
) -> Result<TimeWindow, WindowParseError> {
    let start = parse_window_time(start, now)?.map(|resolved| resolved.instant);
    let mut end = parse_window_time(end, now)?.map(ResolvedTime::closed_end);

    if let (Some(start), Some(closed)) = (start, end) {
        if closed < start {
            end = Some(closed + chrono::Duration::hours(24));
        }
    }

    tracing::debug!(?start, ?end, "resolved time window");
    Ok(TimeWindow { start, end })
}

fn parse_absolute(text: &str) -> Result<Option<ResolvedTime>, WindowParseError> {
    for (format, precision) in [
        (ABSOLUTE_SECONDS, Precision::Second),
        (ABSOLUTE_MINUTES, Precision::Minute),
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            let instant = local_instant(naive)
                .ok_or_else(|| WindowParseError::NonexistentLocalTime(text.to_string()))?;
            return Ok(Some(ResolvedTime { instant, precision }));
        }
    }
    Ok(None)
}

/// Map a wall-clock time to a local instant. Ambiguous times (clocks going
/// back) take the earlier instant; skipped times yield `None`.
fn local_instant(naive: NaiveDateTime) -> Option<Timestamp> {
    match chrono::Local.from_local_datetime(&naive) {
        LocalResult::Single(ts) => Some(ts),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
