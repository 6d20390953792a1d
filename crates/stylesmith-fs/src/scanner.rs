//! Directory scanning with filename filters.
//!
//! ## Learning: Deterministic Ordering
//!
//! `read_dir` hands entries back in whatever order the filesystem stores
//! them. Anything downstream that depends on order (like the cascade in a
//! generated stylesheet) needs the names sorted before they are used.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use regex::Regex;

use crate::helpers::{lstat, read_dir_names};
use crate::{FsError, FsResult};

/// What kind of filesystem object an entry is.
#[derive(Debug, Clone)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, fifos and the like, with their raw metadata.
    Unsupported(Metadata),
}

impl EntryKind {
    fn from_metadata(metadata: Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Unsupported(metadata)
        }
    }
}

/// A classified entry of a scanned directory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Full path of the entry
    pub location: PathBuf,

    /// Entry classification
    pub kind: EntryKind,
}

impl DirectoryEntry {
    /// Returns true if this is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    /// Returns the entry's file name as a string.
    pub fn name(&self) -> &str {
        self.location
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }
}

/// Which entry kinds survive a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    FilesOnly,
    DirsOnly,
    FilesAndDirs,
}

impl Selection {
    fn accepts(self, kind: &EntryKind) -> bool {
        match (self, kind) {
            (_, EntryKind::Unsupported(_)) => false,
            (Selection::FilesAndDirs, _) => true,
            (Selection::FilesOnly, EntryKind::File) => true,
            (Selection::DirsOnly, EntryKind::Directory) => true,
            _ => false,
        }
    }
}

/// Options for [`list_items`].
///
/// With no flags set only files are returned.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only names matching this pattern are considered
    pub filter_files: Option<Regex>,

    /// Return both files and directories
    pub include_dirs: bool,

    /// Return directories only
    pub omit_files: bool,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps only names matching `pattern`.
    pub fn filter_files(mut self, pattern: Regex) -> Self {
        self.filter_files = Some(pattern);
        self
    }

    /// Returns directories as well as files.
    pub fn include_dirs(mut self) -> Self {
        self.include_dirs = true;
        self
    }

    /// Returns directories only.
    pub fn omit_files(mut self) -> Self {
        self.omit_files = true;
        self
    }

    /// Resolves the flags into a selection. `include_dirs` wins.
    pub fn selection(&self) -> Selection {
        if self.include_dirs {
            Selection::FilesAndDirs
        } else if self.omit_files {
            Selection::DirsOnly
        } else {
            Selection::FilesOnly
        }
    }
}

/// Classifies a path without following symlinks.
pub async fn classify(path: impl AsRef<Path>) -> FsResult<EntryKind> {
    Ok(EntryKind::from_metadata(lstat(path).await?))
}

/// Lists the entries of `dir`, sorted by name.
///
/// Names are sorted before classification; the `lstat` calls then run
/// concurrently and results keep the sorted order.
///
/// A missing directory yields [`FsError::NotFound`]; callers decide whether
/// that matters. Entries that cannot be classified are logged and dropped.
pub async fn list_items(dir: impl AsRef<Path>, options: &ListOptions) -> FsResult<Vec<DirectoryEntry>> {
    let dir = dir.as_ref();
    let mut names: Vec<String> = read_dir_names(dir)
        .await?
        .into_iter()
        .filter_map(|name| match name.into_string() {
            Ok(name) => Some(name),
            Err(raw) => {
                tracing::warn!(dir = %dir.display(), name = ?raw, "skipping non UTF-8 file name");
                None
            }
        })
        .filter(|name| {
            options
                .filter_files
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(name))
        })
        .collect();

    names.sort();

    let selection = options.selection();
    let classified = join_all(names.into_iter().map(|name| async move {
        let location = dir.join(&name);
        let kind = classify(&location).await;
        (location, kind)
    }))
    .await;

    let mut entries = Vec::with_capacity(classified.len());
    for (location, kind) in classified {
        match kind {
            Ok(kind) if selection.accepts(&kind) => entries.push(DirectoryEntry { location, kind }),
            Ok(kind) => {
                if let EntryKind::Unsupported(_) = kind {
                    tracing::debug!(path = %location.display(), "skipping unsupported entry");
                }
            }
            Err(FsError::NotFound(_)) => {
                tracing::debug!(path = %location.display(), "entry vanished before it was classified");
            }
            Err(e) => {
                tracing::warn!("Failed to classify entry: {}", e);
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").unwrap();
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name()).collect()
    }

    #[tokio::test]
    async fn test_sorted_output() {
        let dir = tempdir().unwrap();
        for name in ["c.scss", "a.scss", "b.scss"] {
            touch(dir.path(), name);
        }

        let entries = list_items(dir.path(), &ListOptions::new()).await.unwrap();
        assert_eq!(names(&entries), ["a.scss", "b.scss", "c.scss"]);
    }

    #[tokio::test]
    async fn test_concurrent_classification_keeps_sorted_order() {
        let dir = tempdir().unwrap();
        let mut expected = Vec::new();
        for i in (0..60).rev() {
            let name = format!("entry_{i:02}");
            if i % 3 == 0 {
                std::fs::create_dir(dir.path().join(&name)).unwrap();
            } else {
                touch(dir.path(), &name);
            }
            expected.push(name);
        }
        expected.sort();

        let entries = list_items(dir.path(), &ListOptions::new().include_dirs())
            .await
            .unwrap();

        assert_eq!(names(&entries), expected);
        assert!(entries[0].is_directory());
        assert!(entries[1].is_file());
    }

    #[tokio::test]
    async fn test_filter_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "button.scss");
        touch(dir.path(), "button.js");
        touch(dir.path(), "button.scss.bak");

        let options = ListOptions::new().filter_files(Regex::new(r"\.scss$").unwrap());
        let entries = list_items(dir.path(), &options).await.unwrap();
        assert_eq!(names(&entries), ["button.scss"]);
    }

    #[tokio::test]
    async fn test_selection_policy() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "file.scss");
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let files = list_items(dir.path(), &ListOptions::new()).await.unwrap();
        assert_eq!(names(&files), ["file.scss"]);

        let dirs = list_items(dir.path(), &ListOptions::new().omit_files())
            .await
            .unwrap();
        assert_eq!(names(&dirs), ["sub"]);
        assert!(dirs[0].is_directory());

        let both = list_items(dir.path(), &ListOptions::new().include_dirs().omit_files())
            .await
            .unwrap();
        assert_eq!(names(&both), ["file.scss", "sub"]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let err = list_items(dir.path().join("missing"), &ListOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_are_unsupported() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "real.scss");
        std::os::unix::fs::symlink(dir.path().join("real.scss"), dir.path().join("link.scss"))
            .unwrap();

        let kind = classify(dir.path().join("link.scss")).await.unwrap();
        assert!(matches!(kind, EntryKind::Unsupported(_)));

        let entries = list_items(dir.path(), &ListOptions::new().include_dirs())
            .await
            .unwrap();
        assert_eq!(names(&entries), ["real.scss"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_listing_is_sorted_and_filtered(
            stems in prop::collection::btree_set("[a-z]{1,8}", 1..12),
            suffixes in prop::collection::vec(prop::sample::select(vec![".scss", ".css", ".js"]), 12),
        ) {
            let dir = tempdir().unwrap();
            let mut expected = BTreeSet::new();
            for (stem, suffix) in stems.iter().zip(suffixes.iter()) {
                let name = format!("{stem}{suffix}");
                touch(dir.path(), &name);
                if *suffix == ".scss" {
                    expected.insert(name);
                }
            }

            let runtime = tokio::runtime::Runtime::new().unwrap();
            let options = ListOptions::new().filter_files(Regex::new(r"\.scss$").unwrap());
            let entries = runtime.block_on(list_items(dir.path(), &options)).unwrap();

            let listed: Vec<String> = entries.iter().map(|e| e.name().to_string()).collect();
            let expected: Vec<String> = expected.into_iter().collect();
            prop_assert_eq!(listed, expected);
        }
    }
}
