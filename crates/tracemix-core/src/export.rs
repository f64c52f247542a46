//! Export — consumers that write merged records to an output.
//!
//! Records arrive already ordered; sinks write them as they come and never
//! buffer or reorder.
//!
//! | Format  | Shape per record                                           |
//! |---------|------------------------------------------------------------|
//! | `text`  | `<label> <line 1>\n<line 2>\n...` (label omitted for `none`) |
//! | `jsonl` | `{"ts":"...","source":"...","lines":[...]}`               |

use std::io::Write;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::types::{LabelStyle, Record};

/// Consumer interface of the pipeline.
pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> Result<(), ExportError>;

    fn flush(&mut self) -> Result<(), ExportError> {
        Ok(())
    }
}

impl RecordSink for Vec<Record> {
    fn write_record(&mut self, record: &Record) -> Result<(), ExportError> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write_record(&mut self, record: &Record) -> Result<(), ExportError> {
        (**self).write_record(record)
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        (**self).flush()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Build the sink for `format` over `out`.
pub fn sink_for<W>(format: OutputFormat, label: LabelStyle, out: W) -> Box<dyn RecordSink>
where
    W: Write + 'static,
{
    match format {
        OutputFormat::Text => Box::new(TextSink::new(out, label)),
        OutputFormat::Jsonl => Box::new(JsonlSink::new(out, label)),
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub struct TextSink<W: Write> {
    out: W,
    label: LabelStyle,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, label: LabelStyle) -> Self {
        Self { out, label }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for TextSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<(), ExportError> {
        if self.label != LabelStyle::None {
            write!(self.out, "{} ", record.source.label(self.label))?;
        }
        for (i, line) in record.content.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b"\n")?;
            }
            self.out.write_all(line.as_bytes())?;
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        self.out.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonRecord<'a> {
    ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    lines: &'a [String],
}

pub struct JsonlSink<W: Write> {
    out: W,
    label: LabelStyle,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W, label: LabelStyle) -> Self {
        Self { out, label }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for JsonlSink<W> {
    fn write_record(&mut self, record: &Record) -> Result<(), ExportError> {
        let json = JsonRecord {
            ts: record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, false),
            source: (self.label != LabelStyle::None).then(|| record.source.label(self.label)),
            lines: &record.content,
        };
        serde_json::to_writer(&mut self.out, &json)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ExportError> {
        self.out.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
