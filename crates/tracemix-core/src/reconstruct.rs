//! Record reconstructor — groups one source's lines into multi-line records.
//!
//! A record opens at a line carrying a timestamp prefix and absorbs every
//! following line without one (stack traces, wrapped payloads, ...). Lines
//! before the first boundary have nowhere to go and are skipped.
//!
//! # Malformed boundaries
//!
//! A line that looks like a boundary but whose timestamp does not parse
//! (`20221399/250000.000 ...`) still opens a new record. It borrows the
//! timestamp of the previous record from the same source, which keeps the
//! source ordered and therefore keeps the merged output non-decreasing. With
//! no previous record to borrow from, the line and its continuations are
//! skipped like any other preamble.

use crate::error::MergeError;
use crate::queue::{QueueReceiver, QueueSender};
use crate::timestamp::{parse_log_timestamp, record_prefix};
use crate::types::{Line, Record, SourceId, SourceStats, Timestamp};

/// Synchronous record assembly for one source.
#[derive(Debug)]
pub struct RecordAssembler {
    source: SourceId,
    open: Option<Record>,
    last_timestamp: Option<Timestamp>,
    stats: SourceStats,
}

impl RecordAssembler {
    pub fn new(source: SourceId) -> Self {
        Self {
            stats: SourceStats::new(source.clone()),
            source,
            open: None,
            last_timestamp: None,
        }
    }

    /// Feed the next line. Returns the record it finalizes, if any.
    pub fn push(&mut self, text: String) -> Option<Record> {
        self.stats.lines += 1;

        let parsed = record_prefix(&text).map(parse_log_timestamp);
        let Some(parsed) = parsed else {
            match self.open.as_mut() {
                Some(record) => record.content.push(text),
                None => self.stats.skipped += 1,
            }
            return None;
        };

        let timestamp = match parsed {
            Ok(ts) => Some(ts),
            Err(err) => {
                self.stats.malformed += 1;
                tracing::debug!(
                    source = %self.source,
                    line = self.stats.lines,
                    error = %err,
                    "malformed record boundary"
                );
                self.last_timestamp
            }
        };

        let finished = self.take_open();
        match timestamp {
            Some(ts) => {
                self.open = Some(Record::new(ts, self.source.clone(), text));
                self.last_timestamp = Some(ts);
            }
            None => self.stats.skipped += 1,
        }
        finished
    }

    /// Flush the record still open at end of input.
    pub fn finish(&mut self) -> Option<Record> {
        self.take_open()
    }

    pub fn stats(&self) -> &SourceStats {
        &self.stats
    }

    pub fn into_stats(self) -> SourceStats {
        self.stats
    }

    fn take_open(&mut self) -> Option<Record> {
        let record = self.open.take()?;
        self.stats.records += 1;
        Some(record)
    }
}

/// Assemble every record of an in-memory line sequence.
pub fn reconstruct<I, S>(source: SourceId, lines: I) -> Vec<Record>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut assembler = RecordAssembler::new(source);
    let mut records: Vec<Record> = lines
        .into_iter()
        .filter_map(|line| assembler.push(line.into()))
        .collect();
    records.extend(assembler.finish());
    records
}

/// Pipeline stage: consume one source's lines, emit its records. Returns the
/// source's counters once the input ends, fails, or the merge stops pulling.
pub async fn run_reconstructor(
    source: SourceId,
    mut input: QueueReceiver<Result<Line, MergeError>>,
    output: QueueSender<Result<Record, MergeError>>,
) -> SourceStats {
    let mut assembler = RecordAssembler::new(source);

    while let Some(item) = input.recv().await {
        let line = match item {
            Ok(line) => line,
            Err(err) => {
                let _ = output.send(Err(err)).await;
                return assembler.into_stats();
            }
        };

        if let Some(record) = assembler.push(line.text) {
            if output.send(Ok(record)).await.is_err() {
                tracing::debug!(source = %assembler.source, "merge gone, reconstructor stopping");
                return assembler.into_stats();
            }
        }
    }

    if let Some(record) = assembler.finish() {
        let _ = output.send(Ok(record)).await;
    }

    let stats = assembler.into_stats();
    tracing::debug!(
        source = %stats.source,
        lines = stats.lines,
        records = stats.records,
        "reconstructor finished"
    );
    stats
}
