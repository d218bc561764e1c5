// SPDX-FileCopyrightText: 2026 Hostwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process store of the latest snapshot per reader path.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use hostwatch_core::{ReadersData, SnapshotSource};
use tokio::sync::RwLock;
use tracing::warn;

/// Latest raw JSON snapshot of every reader, keyed by prefixed path.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: RwLock<HashMap<String, Vec<u8>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot stored under `path`.
    pub async fn publish(&self, path: impl Into<String>, snapshot: Vec<u8>) {
        self.snapshots.write().await.insert(path.into(), snapshot);
    }

    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.snapshots.read().await.get(path).cloned()
    }

    /// Every stored path, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.snapshots.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Whether at least one of `paths` (or any path, when empty) has a snapshot.
    pub async fn has_any(&self, paths: &[String]) -> bool {
        let snapshots = self.snapshots.read().await;
        if paths.is_empty() {
            !snapshots.is_empty()
        } else {
            paths.iter().any(|path| snapshots.contains_key(path))
        }
    }

    /// Parsed snapshots for `paths`, or for every path when `paths` is empty.
    /// Unparseable snapshots are left out.
    pub async fn readers_data(&self, paths: &[String]) -> ReadersData {
        let raw = self.fetch(paths).await;
        let mut data = ReadersData::new();
        for (path, bytes) in raw {
            match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    data.insert(path, value);
                }
                Err(e) => warn!(path = %path, error = %e, "skipping unparseable snapshot"),
            }
        }
        data
    }
}

#[async_trait]
impl SnapshotSource for SnapshotStore {
    async fn fetch(&self, paths: &[String]) -> BTreeMap<String, Vec<u8>> {
        let snapshots = self.snapshots.read().await;
        if paths.is_empty() {
            return snapshots
                .iter()
                .map(|(path, bytes)| (path.clone(), bytes.clone()))
                .collect();
        }
        paths
            .iter()
            .filter_map(|path| snapshots.get(path).map(|bytes| (path.clone(), bytes.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fetch_returns_only_known_paths() {
        let store = SnapshotStore::new();
        store.publish("/r/cpu", b"{}".to_vec()).await;

        let fetched = store
            .fetch(&["/r/cpu".to_string(), "/r/mem".to_string()])
            .await;
        assert_eq!(fetched.len(), 1);
        assert!(fetched.contains_key("/r/cpu"));
    }

    #[tokio::test]
    async fn empty_path_list_means_everything() {
        let store = SnapshotStore::new();
        store.publish("/r/b", b"1".to_vec()).await;
        store.publish("/r/a", b"2".to_vec()).await;

        assert!(store.has_any(&[]).await);
        assert!(!store.has_any(&["/r/c".to_string()]).await);
        assert_eq!(store.fetch(&[]).await.len(), 2);
        assert_eq!(store.paths().await, vec!["/r/a", "/r/b"]);
    }

    #[tokio::test]
    async fn publish_replaces_previous_snapshot() {
        let store = SnapshotStore::new();
        store.publish("/r/cpu", b"1".to_vec()).await;
        store.publish("/r/cpu", b"2".to_vec()).await;
        assert_eq!(store.get("/r/cpu").await.unwrap(), b"2");
    }

    #[tokio::test]
    async fn readers_data_skips_broken_snapshots() {
        let store = SnapshotStore::new();
        store.publish("/r/ok", br#"{"Data":{"x":1}}"#.to_vec()).await;
        store.publish("/r/bad", b"{".to_vec()).await;

        let data = store.readers_data(&[]).await;
        assert_eq!(data.len(), 1);
        assert_eq!(data["/r/ok"], json!({"Data": {"x": 1}}));
    }
}
