//! JSON snapshot persistence for [`GraphStore`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use invsync_model::{Activity, Exchange};

use crate::error::{LocalResult, LocalStoreError};
use crate::graph::GraphStore;

/// On-disk snapshot document.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    activities: Vec<SnapshotRecord>,
}

/// One activity together with its exchanges.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    activity: Activity,
    #[serde(default)]
    exchanges: Vec<Exchange>,
}

impl GraphStore {
    /// Writes the store to `path` as a pretty-printed JSON snapshot.
    ///
    /// Records are emitted in key order, so saving an unchanged store always
    /// produces identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError::SnapshotIo`] when the file cannot be
    /// written.
    pub fn save(&self, path: &Path) -> LocalResult<()> {
        let snapshot = Snapshot {
            activities: self
                .export_records()
                .into_iter()
                .map(|(activity, exchanges)| SnapshotRecord { activity, exchanges })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&snapshot).map_err(|source| {
            LocalStoreError::SnapshotFormat {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(|source| LocalStoreError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a store from a JSON snapshot previously written by
    /// [`GraphStore::save`].
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError::SnapshotIo`] when the file cannot be read
    /// and [`LocalStoreError::SnapshotFormat`] when it does not parse.
    pub fn load(path: &Path) -> LocalResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| LocalStoreError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Snapshot =
            serde_json::from_str(&json).map_err(|source| LocalStoreError::SnapshotFormat {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_records(
            snapshot
                .activities
                .into_iter()
                .map(|r| (r.activity, r.exchanges))
                .collect(),
        ))
    }
}
