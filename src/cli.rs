//! Command-line surface of the `tracemix` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracemix_core::export::OutputFormat;
use tracemix_core::types::LabelStyle;

#[derive(Debug, Parser)]
#[command(
    name = "tracemix",
    version,
    about = "Merge timestamped log files into one time-ordered stream"
)]
pub struct Cli {
    /// Log files to merge, in tie-break order. `-` reads standard input.
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Output file. `-` writes to standard output.
    #[arg(short, long, default_value = "out.txt", value_name = "PATH")]
    pub output: PathBuf,

    /// Prompt for any window bound not given by --start/--end.
    #[arg(short, long)]
    pub window: bool,

    /// Window start: `YYYY.MM.DD HH:MM[:SS]`, `HH:MM[:SS]`, `now` or `n`.
    #[arg(long, value_name = "WHEN")]
    pub start: Option<String>,

    /// Window end, same forms as --start. Closed to the end of its minute or second.
    #[arg(long, value_name = "WHEN")]
    pub end: Option<String>,

    /// Fixed current instant used to resolve bare times and `now`.
    #[arg(long, value_name = "WHEN")]
    pub now: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// How the source is shown in front of each record.
    #[arg(long, value_enum)]
    pub label: Option<LabelArg>,

    /// Items buffered between stages. 0 hands each item over directly.
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Keep reading every source after the window end has been passed.
    #[arg(long)]
    pub scan_all: bool,

    /// Read configuration from this file instead of ~/.config/tracemix/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not print per-source statistics.
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug diagnostics on stderr (RUST_LOG takes precedence).
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Jsonl,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Jsonl => OutputFormat::Jsonl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LabelArg {
    Path,
    Basename,
    #[value(name = "none")]
    Hidden,
}

impl From<LabelArg> for LabelStyle {
    fn from(arg: LabelArg) -> Self {
        match arg {
            LabelArg::Path => LabelStyle::Path,
            LabelArg::Basename => LabelStyle::Basename,
            LabelArg::Hidden => LabelStyle::None,
        }
    }
}

impl Cli {
    /// Whether standard input is one of the sources.
    pub fn reads_stdin(&self) -> bool {
        self.files
            .iter()
            .any(|path| path.as_os_str() == tracemix_feeds::STDIN_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["tracemix", "a.log", "b.log"]).unwrap();
        assert_eq!(cli.files, vec![PathBuf::from("a.log"), PathBuf::from("b.log")]);
        assert_eq!(cli.output, PathBuf::from("out.txt"));
        assert!(!cli.window);
        assert!(!cli.scan_all);
        assert!(cli.format.is_none());
        assert!(!cli.reads_stdin());
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["tracemix"]).is_err());
    }

    #[test]
    fn window_flags() {
        let cli = Cli::try_parse_from([
            "tracemix",
            "--start",
            "10:00",
            "--end",
            "now",
            "--label",
            "basename",
            "--format",
            "jsonl",
            "-o",
            "-",
            "-",
        ])
        .unwrap();
        assert_eq!(cli.start.as_deref(), Some("10:00"));
        assert_eq!(cli.end.as_deref(), Some("now"));
        assert_eq!(LabelStyle::from(cli.label.unwrap()), LabelStyle::Basename);
        assert_eq!(OutputFormat::from(cli.format.unwrap()), OutputFormat::Jsonl);
        assert!(cli.reads_stdin());
    }
}
