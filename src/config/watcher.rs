//! Range document watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::ranges::{RangeSource, RangeTable};

/// Monitors the edge range document and emits rebuilt tables.
pub struct RangeWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RangeTable>,
}

impl RangeWatcher {
    /// Create a new RangeWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt tables.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RangeTable>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned handle must be kept alive.
    ///
    /// The parent directory is watched rather than the file, so updates that
    /// write a temporary file and rename it over the document keep being
    /// seen. Every change produces a table, falling back to the built-in
    /// ranges when the new document is unusable.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let source = RangeSource::File(self.path.clone());
        let file_name = self.path.file_name().map(|name| name.to_os_string());
        let dir = watch_dir(&self.path);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|name| name.to_os_string()) == file_name);
                    if relevant && touches_file {
                        tracing::info!("Edge range file change detected, reloading");
                        let _ = tx.send(RangeTable::load(&source));
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Edge range watcher started");
        Ok(watcher)
    }
}

/// Directory holding `path`; a bare file name lives in the working directory.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
