//! Window filter — keeps merged records inside an inclusive [`TimeWindow`].
//!
//! The merged stream is non-decreasing, so once a record lands past the end
//! bound nothing later can qualify. With `stop_at_end` the filter stops there
//! and drops its input, which unwinds the scheduler and every source.

use crate::error::MergeError;
use crate::queue::{QueueReceiver, QueueSender};
use crate::types::{Record, TimeWindow, WindowPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFilter {
    pub window: TimeWindow,
    pub stop_at_end: bool,
}

/// Counters for one filter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub seen: usize,
    pub emitted: usize,
    pub before: usize,
    pub after: usize,
    pub stopped_at_end: bool,
}

impl WindowFilter {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            stop_at_end: true,
        }
    }

    pub fn stop_at_end(mut self, stop: bool) -> Self {
        self.stop_at_end = stop;
        self
    }

    pub fn admits(&self, record: &Record) -> bool {
        self.window.contains(&record.timestamp)
    }

    /// Filter an in-memory sequence.
    pub fn apply<I>(&self, records: I) -> Vec<Record>
    where
        I: IntoIterator<Item = Record>,
    {
        records.into_iter().filter(|r| self.admits(r)).collect()
    }

    /// Pipeline stage: forward admitted records from `input` to `output`.
    pub async fn run(
        self,
        mut input: QueueReceiver<Result<Record, MergeError>>,
        output: QueueSender<Result<Record, MergeError>>,
    ) -> FilterStats {
        let mut stats = FilterStats::default();

        while let Some(item) = input.recv().await {
            let record = match item {
                Ok(record) => record,
                Err(err) => {
                    let _ = output.send(Err(err)).await;
                    break;
                }
            };
            stats.seen += 1;

            match self.window.position(&record.timestamp) {
                WindowPosition::Before => stats.before += 1,
                WindowPosition::Inside => {
                    if output.send(Ok(record)).await.is_err() {
                        tracing::debug!("consumer gone, window filter stopping");
                        break;
                    }
                    stats.emitted += 1;
                }
                WindowPosition::After => {
                    stats.after += 1;
                    if self.stop_at_end {
                        tracing::debug!(at = %record.timestamp, "window end passed, stopping");
                        stats.stopped_at_end = true;
                        break;
                    }
                }
            }
        }

        stats
    }
}
