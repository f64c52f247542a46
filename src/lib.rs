//! tracemix — merge timestamped log files into one time-ordered stream.
//!
//! The binary is a thin shell around [`run`]: it resolves configuration and
//! the time window, opens every source, and drives the
//! [`tracemix_core::Pipeline`] into the selected output.
//!
//! ```text
//! Cli ──► Config ──► window ──► open_all ──► Pipeline ──► RecordSink
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use tracemix_core::config::Config;
use tracemix_core::export::{self, RecordSink};
use tracemix_core::timestamp;
use tracemix_core::{MergeReport, Pipeline, PipelineOptions, TimeWindow};

pub mod cli;
pub mod prompt;

pub use cli::Cli;

const OUTPUT_BUFFER: usize = 64 * 1024;

/// Run one merge as described by `cli`.
pub async fn run(cli: Cli) -> anyhow::Result<MergeReport> {
    let config = load_config(&cli)?;
    let window = window_from(&cli).await?;

    let mut options = PipelineOptions::from_config(&config, window);
    if let Some(capacity) = cli.queue_capacity {
        options.queue_capacity = capacity;
    }
    if cli.scan_all {
        options.stop_at_window_end = false;
    }
    let format = cli.format.map(Into::into).unwrap_or(config.output.format);
    let label = cli.label.map(Into::into).unwrap_or(config.output.label);

    let sources = tracemix_feeds::open_all(&cli.files).await?;
    let mut sink = open_output(&cli.output, format, label)?;

    tracing::info!(
        output = %cli.output.display(),
        %format,
        %label,
        "merging {} sources",
        sources.len()
    );

    let report = Pipeline::new(options)
        .run(sources, &mut sink)
        .await
        .with_context(|| format!("merge into {} failed", cli.output.display()))?;
    Ok(report)
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("unable to read config {}", path.display())),
        None => Config::load().context("unable to read ~/.config/tracemix/config.toml"),
    }
}

async fn window_from(cli: &Cli) -> anyhow::Result<TimeWindow> {
    let (start, end) = if cli.window {
        if cli.reads_stdin() && (cli.start.is_none() || cli.end.is_none()) {
            bail!("--window prompts on standard input, which is already a log source; use --start/--end");
        }
        let (start, end) = (cli.start.clone(), cli.end.clone());
        // Terminal reads block, so keep them off the runtime's workers.
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            prompt::fill_window(start, end, &mut stdin.lock(), &mut std::io::stderr())
        })
        .await
        .context("window prompt task failed")?
        .context("unable to read the window from the terminal")?
    } else {
        (
            cli.start.clone().unwrap_or_default(),
            cli.end.clone().unwrap_or_default(),
        )
    };

    let now = match &cli.now {
        Some(text) => timestamp::parse_now_override(text).context("invalid --now")?,
        None => timestamp::now(),
    };

    timestamp::resolve_window(&start, &end, now).context("invalid time window")
}

fn open_output(
    path: &Path,
    format: export::OutputFormat,
    label: tracemix_core::types::LabelStyle,
) -> anyhow::Result<Box<dyn RecordSink>> {
    if path == Path::new(tracemix_feeds::STDIN_PATH) {
        let out = BufWriter::with_capacity(OUTPUT_BUFFER, std::io::stdout());
        return Ok(export::sink_for(format, label, out));
    }

    let file = File::create(path)
        .with_context(|| format!("unable to create output {}", path.display()))?;
    let out = BufWriter::with_capacity(OUTPUT_BUFFER, file);
    Ok(export::sink_for(format, label, out))
}

/// Write the per-source counters and a one-line summary.
pub fn print_statistics<W: Write>(report: &MergeReport, out: &mut W) -> std::io::Result<()> {
    for source in &report.sources {
        writeln!(out, "{source}")?;
    }
    write!(out, "{} records merged, {} written", report.merged, report.emitted)?;
    if report.before_window > 0 || report.after_window > 0 {
        write!(
            out,
            " ({} before window, {} after)",
            report.before_window, report.after_window
        )?;
    }
    if report.stopped_at_end {
        write!(out, ", stopped at window end")?;
    }
    writeln!(out)
}
