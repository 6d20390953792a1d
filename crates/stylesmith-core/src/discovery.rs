//! Style discovery.
//!
//! ## Learning: Concurrent Futures
//!
//! `tokio::try_join!` drives several futures at once on the same task and
//! returns when all of them finish (or the first one fails). Nothing runs
//! in parallel here; the listings simply interleave while they wait on I/O.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use stylesmith_fs::{list_items, DirectoryEntry, FsError, FsResult, ListOptions};

use crate::config::ProjectLayout;

/// Styles common to every theme, in cascade order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSet {
    /// Files from the shared styles directory
    pub shared_styles: Vec<PathBuf>,

    /// Files from every component directory
    pub component_styles: Vec<PathBuf>,
}

/// Finds style and theme files according to a [`ProjectLayout`].
#[derive(Debug, Clone)]
pub struct StyleDiscovery {
    layout: Arc<ProjectLayout>,
}

impl StyleDiscovery {
    pub fn new(layout: Arc<ProjectLayout>) -> Self {
        Self { layout }
    }

    /// Every file directly inside the shared styles directory.
    pub async fn shared_styles(&self) -> FsResult<Vec<PathBuf>> {
        let entries = list_or_empty(&self.layout.shared_dir, &ListOptions::new()).await?;
        Ok(locations(entries))
    }

    /// Style files one level inside each component directory.
    pub async fn component_styles(&self) -> FsResult<Vec<PathBuf>> {
        let dirs = list_or_empty(&self.layout.components_dir, &ListOptions::new().omit_files()).await?;

        let options = ListOptions::new().filter_files(self.layout.style_pattern.clone());
        let per_component = try_join_all(
            dirs.iter()
                .map(|dir| list_or_empty(&dir.location, &options)),
        )
        .await?;

        Ok(per_component.into_iter().flat_map(locations).collect())
    }

    /// Shared and component styles, discovered concurrently.
    pub async fn common_styles(&self) -> FsResult<StyleSet> {
        let (shared_styles, component_styles) =
            tokio::try_join!(self.shared_styles(), self.component_styles())?;

        tracing::debug!(
            shared = shared_styles.len(),
            components = component_styles.len(),
            "discovered common styles"
        );

        Ok(StyleSet {
            shared_styles,
            component_styles,
        })
    }

    /// Theme definition files.
    pub async fn themes(&self) -> FsResult<Vec<PathBuf>> {
        let options = ListOptions::new().filter_files(self.layout.theme_pattern.clone());
        let entries = list_or_empty(&self.layout.themes_dir, &options).await?;
        Ok(locations(entries))
    }
}

/// Lists `dir`, treating a missing directory as empty.
async fn list_or_empty(dir: &Path, options: &ListOptions) -> FsResult<Vec<DirectoryEntry>> {
    match list_items(dir, options).await {
        Err(FsError::NotFound(_)) => {
            tracing::warn!(dir = %dir.display(), "directory not found, nothing to discover");
            Ok(Vec::new())
        }
        other => other,
    }
}

fn locations(entries: Vec<DirectoryEntry>) -> Vec<PathBuf> {
    entries.into_iter().map(|entry| entry.location).collect()
}
