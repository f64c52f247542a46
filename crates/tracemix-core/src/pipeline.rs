//! Pipeline — wires line sources, reconstructors, the merge and the window
//! filter into one running set of tasks.
//!
//! ```text
//! Source 0 ─► Reconstructor 0 ─┐
//! Source 1 ─► Reconstructor 1 ─┼─► MergeScheduler ─► WindowFilter ─► MergedStream
//! Source n ─► Reconstructor n ─┘
//! ```
//!
//! Every arrow is a bounded queue of the configured capacity. Each box is a
//! `tokio` task; [`MergedStream`] is the consumer end, read by the caller.

use tokio::task::JoinHandle;

use crate::error::{ExportError, MergeError};
use crate::export::RecordSink;
use crate::merge::{MergeCursor, MergeOutcome, MergeScheduler};
use crate::queue::{self, QueueReceiver};
use crate::reconstruct::run_reconstructor;
use crate::source::{run_line_source, Source};
use crate::types::{MergeReport, Record, SourceStats, TimeWindow};
use crate::window::{FilterStats, WindowFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub queue_capacity: usize,
    pub window: TimeWindow,
    pub stop_at_window_end: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            window: TimeWindow::unbounded(),
            stop_at_window_end: true,
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &crate::config::Config, window: TimeWindow) -> Self {
        Self {
            queue_capacity: config.merge.queue_capacity,
            window,
            stop_at_window_end: config.window.stop_at_end,
        }
    }
}

/// Failure while draining the pipeline into a sink.
#[derive(Debug, thiserror::Error)]
pub enum DrainError {
    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Spawn every stage for `sources` (in tie-break order) and return the
    /// consumer end. Must be called inside a `tokio` runtime.
    pub fn spawn(&self, sources: Vec<Source>) -> MergedStream {
        let capacity = self.options.queue_capacity;
        let mut cursors = Vec::with_capacity(sources.len());
        let mut reconstructors = Vec::with_capacity(sources.len());

        for (index, source) in sources.into_iter().enumerate() {
            let id = source.id().clone();
            let (line_tx, line_rx) = queue::bounded(capacity);
            let (record_tx, record_rx) = queue::bounded(capacity);

            tokio::spawn(run_line_source(source, line_tx));
            reconstructors.push(tokio::spawn(run_reconstructor(
                id.clone(),
                line_rx,
                record_tx,
            )));
            cursors.push(MergeCursor::new(id, index, record_rx));
        }

        let (merged_tx, merged_rx) = queue::bounded(capacity);
        let (filtered_tx, filtered_rx) = queue::bounded(capacity);

        let merge = tokio::spawn(MergeScheduler::new(cursors).run(merged_tx));
        let filter = WindowFilter::new(self.options.window)
            .stop_at_end(self.options.stop_at_window_end);
        let filter = tokio::spawn(filter.run(merged_rx, filtered_tx));

        tracing::info!(
            sources = reconstructors.len(),
            capacity,
            window = ?self.options.window,
            "pipeline started"
        );

        MergedStream {
            output: Some(filtered_rx),
            reconstructors,
            merge,
            filter,
        }
    }

    /// Run to completion, writing every admitted record into `sink`.
    pub async fn run<S>(
        &self,
        sources: Vec<Source>,
        sink: &mut S,
    ) -> Result<MergeReport, DrainError>
    where
        S: RecordSink + ?Sized,
    {
        self.spawn(sources).drain_into(sink).await
    }
}

/// Consumer end of a running pipeline.
pub struct MergedStream {
    output: Option<QueueReceiver<Result<Record, MergeError>>>,
    reconstructors: Vec<JoinHandle<SourceStats>>,
    merge: JoinHandle<MergeOutcome>,
    filter: JoinHandle<FilterStats>,
}

impl MergedStream {
    /// The next record in merged order, `Ok(None)` at the end.
    pub async fn next(&mut self) -> Result<Option<Record>, MergeError> {
        let Some(output) = self.output.as_mut() else {
            return Ok(None);
        };
        match output.recv().await {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(err)) => {
                self.output = None;
                Err(err)
            }
            None => {
                self.output = None;
                Ok(None)
            }
        }
    }

    /// Write every remaining record into `sink`, then wait for all stages.
    pub async fn drain_into<S>(mut self, sink: &mut S) -> Result<MergeReport, DrainError>
    where
        S: RecordSink + ?Sized,
    {
        while let Some(record) = self.next().await? {
            sink.write_record(&record)?;
        }
        sink.flush()?;
        Ok(self.finish().await?)
    }

    /// Collect every remaining record.
    pub async fn collect(mut self) -> Result<Vec<Record>, MergeError> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        self.finish().await?;
        Ok(records)
    }

    /// Stop reading, let every stage unwind and gather their counters.
    pub async fn finish(mut self) -> Result<MergeReport, MergeError> {
        // Dropping the consumer end makes any stage still sending give up.
        self.output = None;

        let filter = self.filter.await?;
        let merge = self.merge.await?;
        let mut sources = Vec::with_capacity(self.reconstructors.len());
        for handle in self.reconstructors {
            sources.push(handle.await?);
        }

        let report = MergeReport {
            sources,
            merged: merge.merged(),
            emitted: filter.emitted,
            before_window: filter.before,
            after_window: filter.after,
            stopped_at_end: filter.stopped_at_end,
        };
        tracing::info!(
            merged = report.merged,
            emitted = report.emitted,
            stopped_at_end = report.stopped_at_end,
            "pipeline finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_log_timestamp;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn lines(prefix: &str, stamps: &[&str]) -> Vec<String> {
        stamps
            .iter()
            .enumerate()
            .map(|(i, ts)| format!("20220128/{ts} {prefix}{i}"))
            .collect()
    }

    #[rstest]
    #[case::rendezvous(0)]
    #[case::single(1)]
    #[case::wide(1024)]
    #[tokio::test]
    async fn merges_sources_in_order(#[case] capacity: usize) {
        let pipeline = Pipeline::new(PipelineOptions {
            queue_capacity: capacity,
            ..Default::default()
        });
        let sources = vec![
            Source::from_lines("a", lines("a", &["100000.000", "100000.200", "100000.200"])),
            Source::from_lines("b", Vec::<String>::new()),
            Source::from_lines("c", lines("c", &["100000.100", "100000.200", "100000.300"])),
        ];

        let records = pipeline.spawn(sources).collect().await.unwrap();
        let order: Vec<String> = records
            .iter()
            .map(|r| r.content[0].split(' ').nth(1).unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["a0", "c0", "a1", "a2", "c1", "c2"]);
    }

    #[tokio::test]
    async fn report_counts_every_stage() {
        let pipeline = Pipeline::new(PipelineOptions::default());
        let sources = vec![
            Source::from_lines("a", ["preamble", "20220128/100000.000 a", "  more"]),
            Source::from_lines("b", ["20220128/100000.500 b"]),
        ];
        let mut sink: Vec<Record> = Vec::new();
        let report = pipeline.run(sources, &mut sink).await.unwrap();

        assert_eq!(sink.len(), 2);
        assert_eq!(report.merged, 2);
        assert_eq!(report.emitted, 2);
        assert_eq!(report.sources[0].lines, 3);
        assert_eq!(report.sources[0].skipped, 1);
        assert_eq!(report.sources[1].records, 1);
    }

    #[tokio::test]
    async fn window_end_stops_early() {
        let window = TimeWindow {
            start: Some(parse_log_timestamp("20220128/100000.100").unwrap()),
            end: Some(parse_log_timestamp("20220128/100000.300").unwrap()),
        };
        let pipeline = Pipeline::new(PipelineOptions {
            queue_capacity: 0,
            window,
            stop_at_window_end: true,
        });
        let stamps: Vec<String> = (0..60).map(|i| format!("1000{i:02}.000")).collect();
        let stamps: Vec<&str> = stamps.iter().map(String::as_str).collect();
        let sources = vec![Source::from_lines("a", lines("a", &stamps))];

        let mut sink: Vec<Record> = Vec::new();
        let report = pipeline.run(sources, &mut sink).await.unwrap();

        assert!(sink.is_empty());
        assert!(report.stopped_at_end);
        assert_eq!(report.before_window, 1);
        assert!(report.merged < 60);
    }

    #[tokio::test]
    async fn read_failure_aborts_the_run() {
        let failing = futures::stream::iter(vec![
            Ok("20220128/100000.000 fine".to_string()),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "unplugged")),
        ]);
        let sources = vec![
            Source::from_lines("ok", ["20220128/100000.000 ok"]),
            Source::new("bad", failing),
        ];
        let err = Pipeline::default().spawn(sources).collect().await.unwrap_err();
        match err {
            MergeError::Io { source_id, .. } => assert_eq!(source_id.as_str(), "bad"),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn finish_early_unwinds_all_stages() {
        let many: Vec<String> = (0..500)
            .map(|i| format!("20220128/10{:02}{:02}.000 x", (i / 60) % 60, i % 60))
            .collect();
        let sources = vec![
            Source::from_lines("a", many.clone()),
            Source::from_lines("b", many),
        ];
        let mut stream = Pipeline::new(PipelineOptions {
            queue_capacity: 0,
            ..Default::default()
        })
        .spawn(sources);

        assert!(stream.next().await.unwrap().is_some());
        let report = stream.finish().await.unwrap();
        assert!(report.merged < 1000);
    }
}
