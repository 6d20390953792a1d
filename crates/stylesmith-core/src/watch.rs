//! Watch mode: rebuild whenever a style file changes.
//!
//! ## Learning: Bridging Threads and Async
//!
//! `notify` calls its handler on its own thread. The handler pushes paths
//! into a `tokio::sync::mpsc` channel with `blocking_send`, and the async
//! side simply awaits `recv()`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::build::Builder;
use crate::config::ProjectLayout;
use crate::CoreResult;

/// Recursive watcher over the project root that yields changed style files.
pub struct StyleWatcher {
    /// Kept alive for as long as events are wanted
    _watcher: RecommendedWatcher,

    changes: mpsc::Receiver<PathBuf>,
}

impl StyleWatcher {
    /// Starts watching `layout.root`.
    pub fn start(layout: Arc<ProjectLayout>) -> CoreResult<Self> {
        let (tx, rx) = mpsc::channel(100);
        let root = layout.root.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    for path in style_changes(&layout, event) {
                        let _ = tx.blocking_send(path);
                    }
                }
                Err(e) => tracing::warn!("Watch error: {}", e),
            }
        })?;
        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            changes: rx,
        })
    }

    /// Waits for the next changed style file.
    pub async fn next_change(&mut self) -> Option<PathBuf> {
        self.changes.recv().await
    }
}

/// Returns true if `path` names a style source file.
pub fn is_style_file(path: &Path, extension: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.ends_with(&format!(".{extension}")))
}

/// Paths in `event` that should trigger a rebuild.
///
/// Only create/modify/remove events count, and files written by the build
/// itself are ignored.
pub fn style_changes(layout: &ProjectLayout, event: Event) -> Vec<PathBuf> {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return Vec::new();
    }

    event
        .paths
        .into_iter()
        .filter(|path| is_style_file(path, &layout.extension) && !layout.is_output(path))
        .collect()
}

/// Rebuilds on every style change until the channel closes or Ctrl-C.
///
/// Changes are handled one at a time in arrival order; each one runs a full
/// build.
pub async fn watch(builder: &Builder) -> CoreResult<()> {
    let layout = Arc::clone(builder.layout());
    let mut watcher = StyleWatcher::start(Arc::clone(&layout))?;
    tracing::info!(root = %layout.root.display(), "watching {} files", layout.extension);

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    rebuild_on_changes(builder, &mut watcher.changes, ctrl_c).await;

    Ok(())
}

/// Runs a build for every path received on `changes` until the channel
/// closes or `shutdown` resolves.
///
/// `shutdown` is also raced against the build in flight, so stopping never
/// waits for a slow rebuild.
pub async fn rebuild_on_changes<S>(builder: &Builder, changes: &mut mpsc::Receiver<PathBuf>, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(path) = change else { break };
                tracing::info!("{} changed. recompiling...", path.display());
                tokio::select! {
                    _ = builder.compile() => {}
                    _ = &mut shutdown => {
                        tracing::info!("stopping watcher, abandoning build in progress");
                        break;
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("stopping watcher");
                break;
            }
        }
    }
}
