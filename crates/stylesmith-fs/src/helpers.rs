//! Async wrappers over primitive filesystem operations.
//!
//! ## Learning: Mapping Errors at the Boundary
//!
//! Each helper converts `std::io::Error` into `FsError` right where the
//! call happens, so the path that failed travels with the error. Callers
//! then only match on two cases: "it wasn't there" and "something broke".

use std::ffi::OsString;
use std::fs::Metadata;
use std::path::Path;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{FsError, FsResult};

/// Lists the raw entry names of a directory, in enumeration order.
pub async fn read_dir_names(dir: impl AsRef<Path>) -> FsResult<Vec<OsString>> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| FsError::from_io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FsError::from_io(dir, e))?
    {
        names.push(entry.file_name());
    }

    Ok(names)
}

/// Reads metadata without following symlinks.
pub async fn lstat(path: impl AsRef<Path>) -> FsResult<Metadata> {
    let path = path.as_ref();
    tokio::fs::symlink_metadata(path)
        .await
        .map_err(|e| FsError::from_io(path, e))
}

/// Removes an empty directory.
pub async fn remove_dir(dir: impl AsRef<Path>) -> FsResult<()> {
    let dir = dir.as_ref();
    tokio::fs::remove_dir(dir)
        .await
        .map_err(|e| FsError::from_io(dir, e))
}

/// Creates a directory along with any missing parents.
pub async fn create_dir(dir: impl AsRef<Path>) -> FsResult<()> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| FsError::from_io(dir, e))
}

/// Deletes a single file.
pub async fn remove_file(path: impl AsRef<Path>) -> FsResult<()> {
    let path = path.as_ref();
    tokio::fs::remove_file(path)
        .await
        .map_err(|e| FsError::from_io(path, e))
}

/// Writes `data` to `path`, replacing any existing content.
pub async fn write_file(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> FsResult<()> {
    let path = path.as_ref();
    tokio::fs::write(path, data)
        .await
        .map_err(|e| FsError::from_io(path, e))
}

/// Appends `data` to an already open output stream and flushes it, so a
/// failure is reported for this write and not a later one.
///
/// `path` is only used to label a failure.
pub async fn write_to_stream<W>(stream: &mut W, path: &Path, data: &[u8]) -> FsResult<()>
where
    W: AsyncWrite + Unpin,
{
    stream
        .write_all(data)
        .await
        .map_err(|e| FsError::from_io(path, e))?;
    stream.flush().await.map_err(|e| FsError::from_io(path, e))
}

/// Removes a directory, succeeding quietly if it is already gone.
pub async fn remove_dir_if_exists(dir: impl AsRef<Path>) -> FsResult<()> {
    match remove_dir(dir).await {
        Err(FsError::NotFound(_)) => Ok(()),
        other => other,
    }
}

/// Deletes every file inside `dir`.
///
/// Returns `Ok(true)` when the directory existed and was emptied and
/// `Ok(false)` when it did not exist. The layout is expected to be flat:
/// a nested directory makes the removal fail.
pub async fn empty_dir(dir: impl AsRef<Path>) -> FsResult<bool> {
    let dir = dir.as_ref();
    let names = match read_dir_names(dir).await {
        Ok(names) => names,
        Err(FsError::NotFound(_)) => return Ok(false),
        Err(e) => return Err(e),
    };

    for name in names {
        match remove_file(dir.join(&name)).await {
            // Someone else got there first
            Err(FsError::NotFound(_)) => {}
            other => other?,
        }
    }

    Ok(true)
}

/// Empties, removes and recreates `dir`.
///
/// A missing directory is simply created.
pub async fn clean_dir(dir: impl AsRef<Path>) -> FsResult<()> {
    let dir = dir.as_ref();

    if empty_dir(dir).await? {
        remove_dir_if_exists(dir).await?;
    }
    create_dir(dir).await?;

    tracing::debug!(dir = %dir.display(), "cleaned output directory");
    Ok(())
}
