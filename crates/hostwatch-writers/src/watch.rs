// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem change notifications bridged into async callbacks.
//!
//! A [`DirWatcher`] registers with the platform watcher synchronously, so
//! changes made right after [`DirWatcher::new`] returns are not missed. The
//! event loop in [`DirWatcher::run`] stops on cancellation or when the
//! event source goes away.

use std::path::{Path, PathBuf};

use hostwatch_core::HostwatchError;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Filesystem changes that trigger the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
}

/// Maps a raw event to a change of interest. Access, metadata-only and
/// unclassified events yield `None`.
pub fn classify(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Create),
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
            Some(ChangeKind::Write)
        }
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
        EventKind::Remove(_) => Some(ChangeKind::Remove),
        _ => None,
    }
}

/// A live subscription to one directory.
pub struct DirWatcher {
    path: PathBuf,
    // Dropping the watcher closes the event channel.
    _watcher: RecommendedWatcher,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
}

impl std::fmt::Debug for DirWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirWatcher").field("path", &self.path).finish()
    }
}

impl DirWatcher {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, HostwatchError> {
        let path = path.as_ref().to_path_buf();
        let (tx, events) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // The receiver is gone once the loop exits; nothing left to do.
            let _ = tx.send(res);
        })
        .map_err(|e| watch_error(&path, "failed to create watcher", e))?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| watch_error(&path, "failed to watch directory", e))?;

        debug!(path = %path.display(), "directory watch registered");
        Ok(Self {
            path,
            _watcher: watcher,
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delivers each change of interest to `callback` until cancelled.
    ///
    /// Errors from the event source and from the callback are logged and the
    /// loop keeps going.
    pub async fn run<F>(mut self, mut callback: F, cancel: CancellationToken)
    where
        F: FnMut(ChangeKind, &Path) -> Result<(), HostwatchError> + Send,
    {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(path = %self.path.display(), "directory watch stopped");
                    return;
                }
                event = self.events.recv() => {
                    let Some(event) = event else {
                        debug!(path = %self.path.display(), "watch event source closed");
                        return;
                    };
                    match event {
                        Ok(event) => {
                            let Some(change) = classify(&event.kind) else {
                                continue;
                            };
                            let changed = event.paths.first().map(PathBuf::as_path).unwrap_or(self.path.as_path());
                            debug!(path = %changed.display(), change = ?change, "directory changed");
                            if let Err(e) = callback(change, changed) {
                                warn!(path = %changed.display(), error = %e, "watch callback failed");
                            }
                        }
                        Err(e) => {
                            warn!(path = %self.path.display(), error = %e, "watch error");
                        }
                    }
                }
            }
        }
    }
}

/// Watches `path` and invokes `callback` on every change until `cancel` fires.
pub async fn watch_dir<F>(
    path: impl AsRef<Path>,
    callback: F,
    cancel: CancellationToken,
) -> Result<(), HostwatchError>
where
    F: FnMut(ChangeKind, &Path) -> Result<(), HostwatchError> + Send,
{
    let watcher = DirWatcher::new(path)?;
    watcher.run(callback, cancel).await;
    Ok(())
}

fn watch_error(path: &Path, message: &str, e: notify::Error) -> HostwatchError {
    HostwatchError::Watch {
        path: path.to_path_buf(),
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}
