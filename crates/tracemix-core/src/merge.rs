//! Merge scheduler — streaming k-way merge of per-source record sequences.
//!
//! Each source contributes one [`MergeCursor`] holding at most one pending
//! record (its head), so memory stays proportional to the number of sources
//! no matter how long the inputs are. Cursors live in a `Vec` in source order;
//! an exhausted cursor is removed from it.
//!
//! The next record is the head with the smallest timestamp. Ties go to the
//! cursor with the lowest source index, which keeps same-millisecond records
//! clustered in input order and makes runs reproducible.

use crate::error::MergeError;
use crate::queue::{QueueReceiver, QueueSender};
use crate::types::{Record, SourceId, Timestamp};

/// Scheduler bookkeeping for one active source.
pub struct MergeCursor {
    pub source: SourceId,
    /// Position of the source in the configured source list.
    pub source_index: usize,
    head: Option<Record>,
    last_emitted: Option<Timestamp>,
    warned_out_of_order: bool,
    input: QueueReceiver<Result<Record, MergeError>>,
}

impl MergeCursor {
    pub fn new(
        source: SourceId,
        source_index: usize,
        input: QueueReceiver<Result<Record, MergeError>>,
    ) -> Self {
        Self {
            source,
            source_index,
            head: None,
            last_emitted: None,
            warned_out_of_order: false,
            input,
        }
    }

    /// Pull the next record into `head`. `Ok(false)` means the source is
    /// exhausted.
    async fn refill(&mut self) -> Result<bool, MergeError> {
        match self.input.recv().await {
            Some(Ok(record)) => {
                if let Some(last) = self.last_emitted {
                    if record.timestamp < last && !self.warned_out_of_order {
                        self.warned_out_of_order = true;
                        tracing::warn!(
                            source = %self.source,
                            previous = %last,
                            current = %record.timestamp,
                            "source is not in timestamp order; merged output will not be either"
                        );
                    }
                }
                self.head = Some(record);
                Ok(true)
            }
            Some(Err(err)) => Err(err),
            None => Ok(false),
        }
    }
}

/// Index of the cursor whose head comes next: smallest timestamp, then
/// lowest source index. Cursors without a head are ignored.
pub fn next_cursor(cursors: &[MergeCursor]) -> Option<usize> {
    cursors
        .iter()
        .enumerate()
        .filter_map(|(pos, cursor)| {
            cursor
                .head
                .as_ref()
                .map(|head| (head.timestamp, cursor.source_index, pos))
        })
        .min_by_key(|&(timestamp, source_index, _)| (timestamp, source_index))
        .map(|(_, _, pos)| pos)
}

/// How the merge ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Every source was exhausted.
    Exhausted { merged: usize },
    /// The consumer stopped listening before the sources ran dry.
    Cancelled { merged: usize },
    /// A source failed; the error was forwarded downstream.
    Failed { merged: usize },
}

impl MergeOutcome {
    pub fn merged(&self) -> usize {
        match *self {
            MergeOutcome::Exhausted { merged }
            | MergeOutcome::Cancelled { merged }
            | MergeOutcome::Failed { merged } => merged,
        }
    }
}

pub struct MergeScheduler {
    cursors: Vec<MergeCursor>,
}

impl MergeScheduler {
    pub fn new(cursors: Vec<MergeCursor>) -> Self {
        Self { cursors }
    }

    /// Pipeline stage: merge every cursor into `output` in timestamp order.
    pub async fn run(mut self, output: QueueSender<Result<Record, MergeError>>) -> MergeOutcome {
        let mut merged = 0;

        // Prime every cursor; a source that yields nothing contributes nothing.
        let mut primed = Vec::with_capacity(self.cursors.len());
        for mut cursor in std::mem::take(&mut self.cursors) {
            match cursor.refill().await {
                Ok(true) => primed.push(cursor),
                Ok(false) => tracing::debug!(source = %cursor.source, "source is empty"),
                Err(err) => {
                    let _ = output.send(Err(err)).await;
                    return MergeOutcome::Failed { merged };
                }
            }
        }
        self.cursors = primed;
        tracing::info!(sources = self.cursors.len(), "merge started");

        while let Some(pos) = next_cursor(&self.cursors) {
            let cursor = &mut self.cursors[pos];
            let Some(record) = cursor.head.take() else {
                break;
            };
            cursor.last_emitted = Some(record.timestamp);

            if output.send(Ok(record)).await.is_err() {
                tracing::debug!(merged, "merge output closed, stopping");
                return MergeOutcome::Cancelled { merged };
            }
            merged += 1;

            match cursor.refill().await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(source = %cursor.source, "source exhausted");
                    self.cursors.remove(pos);
                }
                Err(err) => {
                    let _ = output.send(Err(err)).await;
                    return MergeOutcome::Failed { merged };
                }
            }
        }

        tracing::info!(merged, "merge finished");
        MergeOutcome::Exhausted { merged }
    }
}
