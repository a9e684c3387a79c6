//! Error types for the local store.

use std::path::PathBuf;

use thiserror::Error;

use invsync_model::ActivityKey;

/// Result type for local store operations.
pub type LocalResult<T> = Result<T, LocalStoreError>;

/// Errors that can occur in the local store adapter.
#[derive(Error, Debug)]
pub enum LocalStoreError {
    /// An unconditional read targeted an activity that is not in the store.
    #[error("activity {key} not found in local store")]
    ActivityNotFound {
        /// Key of the missing activity.
        key: ActivityKey,
    },

    /// A snapshot file could not be read or written.
    #[error("snapshot I/O error for {path}: {source}")]
    SnapshotIo {
        /// Path of the snapshot file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A snapshot file exists but does not parse.
    #[error("snapshot format error in {path}: {source}")]
    SnapshotFormat {
        /// Path of the snapshot file.
        path: PathBuf,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl LocalStoreError {
    /// Creates an [`LocalStoreError::ActivityNotFound`] for `key`.
    #[must_use]
    pub fn not_found(key: &ActivityKey) -> Self {
        Self::ActivityNotFound { key: key.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_key() {
        let err = LocalStoreError::not_found(&ActivityKey::new("db1", "a9"));
        assert_eq!(err.to_string(), "activity db1:a9 not found in local store");
    }
}
