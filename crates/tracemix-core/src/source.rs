//! Line source — turns one input into a lazy, finite sequence of [`Line`]s.
//!
//! A [`Source`] is the producer interface of the pipeline: any stream of
//! `io::Result<String>` tagged with a [`SourceId`]. Concrete producers (files,
//! stdin) live in `tracemix-feeds`; in-memory sources are handy for tests and
//! embedding.

use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::MergeError;
use crate::queue::QueueSender;
use crate::types::{Line, SourceId};

/// Raw lines of one source, without terminators.
pub type LineStream = BoxStream<'static, std::io::Result<String>>;

/// One input of the merge.
pub struct Source {
    id: SourceId,
    lines: LineStream,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Source {
    pub fn new(
        id: impl Into<SourceId>,
        lines: impl Stream<Item = std::io::Result<String>> + Send + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            lines: lines.boxed(),
        }
    }

    /// Read lines from `reader`, splitting on `\n` and dropping a trailing
    /// `\r`. A line that is not valid UTF-8 is read as ISO-8859-15.
    pub fn from_reader<R>(id: impl Into<SourceId>, reader: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        let lines =
            stream::try_unfold((reader, Vec::new()), |(reader, buf)| next_line(reader, buf));
        Self::new(id, lines)
    }

    /// An in-memory source.
    pub fn from_lines<I, S>(id: impl Into<SourceId>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<std::io::Result<String>> =
            lines.into_iter().map(|line| Ok(line.into())).collect();
        Self::new(id, stream::iter(lines))
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Give up the source's identity and take its raw lines.
    pub fn into_lines(self) -> LineStream {
        self.lines
    }
}

async fn next_line<R>(
    mut reader: R,
    mut buf: Vec<u8>,
) -> std::io::Result<Option<(String, (R, Vec<u8>))>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    let line = decode_line(&buf);
    Ok(Some((line, (reader, buf))))
}

/// UTF-8 when valid, otherwise ISO-8859-15 (Latin-9), which maps every byte.
pub fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| latin9_char(b)).collect(),
    }
}

/// Latin-9 is Latin-1 with eight code points replaced.
fn latin9_char(byte: u8) -> char {
    match byte {
        0xA4 => '\u{20AC}',
        0xA6 => '\u{0160}',
        0xA8 => '\u{0161}',
        0xB4 => '\u{017D}',
        0xB8 => '\u{017E}',
        0xBC => '\u{0152}',
        0xBD => '\u{0153}',
        0xBE => '\u{0178}',
        other => char::from(other),
    }
}

/// Drive `source` into `output` until it is exhausted, fails, or the
/// downstream stage stops listening. A read failure is forwarded as the last
/// item.
pub async fn run_line_source(mut source: Source, output: QueueSender<Result<Line, MergeError>>) {
    tracing::debug!(source = %source.id, "line source started");

    while let Some(next) = source.lines.next().await {
        let item = match next {
            Ok(text) => Ok(Line {
                source: source.id.clone(),
                text,
            }),
            Err(err) => Err(MergeError::Io {
                source_id: source.id.clone(),
                source: err,
            }),
        };
        let fatal = item.is_err();

        if output.send(item).await.is_err() {
            tracing::debug!(source = %source.id, "reconstructor gone, line source stopping");
            return;
        }
        if fatal {
            tracing::warn!(source = %source.id, "line source failed");
            return;
        }
    }

    tracing::debug!(source = %source.id, "line source exhausted");
}
