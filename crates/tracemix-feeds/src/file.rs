//! File feed — reads a log file from start to end.

use std::path::Path;

use tokio::io::BufReader;
use tracemix_core::Source;

use crate::FeedError;

const READ_BUFFER: usize = 64 * 1024;

/// Open `path` for reading. The source is identified by the path as given.
pub async fn open(path: &Path) -> Result<Source, FeedError> {
    let open_err = |source| FeedError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = tokio::fs::File::open(path).await.map_err(open_err)?;
    let metadata = file.metadata().await.map_err(open_err)?;
    if metadata.is_dir() {
        return Err(FeedError::Directory {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(path = %path.display(), bytes = metadata.len(), "opened file source");
    Ok(Source::from_reader(
        path.display().to_string(),
        BufReader::with_capacity(READ_BUFFER, file),
    ))
}
