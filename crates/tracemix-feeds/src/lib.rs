//! tracemix-feeds — line producers for tracemix.
//!
//! Each feed opens an input and wraps it in a [`tracemix_core::Source`]. All
//! inputs are opened up front by [`open_all`], so a missing or unreadable
//! file aborts the run before any output is written.

use std::path::{Path, PathBuf};

use tracemix_core::Source;

pub mod file;
pub mod stdin;

/// Path that selects standard input instead of a file.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("unable to open source {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source {} is a directory", .path.display())]
    Directory { path: PathBuf },

    #[error("standard input (-) can only be given once")]
    DuplicateStdin,
}

/// Open every path in order. `-` selects standard input.
pub async fn open_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Source>, FeedError> {
    let mut sources = Vec::with_capacity(paths.len());
    let mut stdin_taken = false;

    for path in paths {
        let path = path.as_ref();
        if path == Path::new(STDIN_PATH) {
            if stdin_taken {
                return Err(FeedError::DuplicateStdin);
            }
            stdin_taken = true;
            sources.push(stdin::open());
        } else {
            sources.push(file::open(path).await?);
        }
    }

    tracing::debug!(count = sources.len(), "opened sources");
    Ok(sources)
}
