//! Stdin feed — lines piped into the process.

use tokio::io::BufReader;
use tracemix_core::Source;

/// Identifier used for standard input in output labels and statistics.
pub const STDIN_ID: &str = "stdin";

pub fn open() -> Source {
    Source::from_reader(STDIN_ID, BufReader::new(tokio::io::stdin()))
}
