//! # Stylesmith FS
//!
//! Async filesystem helpers and directory scanning.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Async I/O
//! - Every helper is an `async fn` backed by `tokio::fs`
//! - Callers `.await` each operation; nothing blocks the runtime thread
//! - Errors come back as values (`FsResult`), never as panics
//!
//! ### Error Classification
//! - "Not found" is split out into its own variant so callers can decide
//!   whether a missing directory is fatal or just means "nothing to do"

mod helpers;
mod scanner;

pub use helpers::{
    clean_dir, create_dir, empty_dir, lstat, read_dir_names, remove_dir, remove_dir_if_exists,
    remove_file, write_file, write_to_stream,
};
pub use scanner::{classify, list_items, DirectoryEntry, EntryKind, ListOptions, Selection};

use std::io;
use std::path::{Path, PathBuf};

/// Result type for filesystem operations
pub type FsResult<T> = Result<T, FsError>;

/// Errors that can occur during filesystem operations
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Wraps an `io::Error`, splitting out the "not found" kind.
    pub fn from_io(path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == io::ErrorKind::NotFound {
            FsError::NotFound(path)
        } else {
            FsError::Io { path, source }
        }
    }

    /// Returns true if the error means the entity did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }

    /// Returns the path the failed operation was working on.
    pub fn path(&self) -> &Path {
        match self {
            FsError::NotFound(path) => path,
            FsError::Io { path, .. } => path,
        }
    }
}
