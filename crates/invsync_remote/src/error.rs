//! Error types for the remote store.

use thiserror::Error;

/// Result type for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteStoreError>;

/// Errors that can occur in the remote store adapter.
#[derive(Error, Debug)]
pub enum RemoteStoreError {
    /// An unconditional read targeted an activity that is not in the store.
    #[error("activity {database}:{code} not found in remote store")]
    ActivityNotFound {
        /// Logical database of the missing activity.
        database: String,
        /// Code of the missing activity.
        code: String,
    },

    /// The schema namespace contains characters that cannot form a table
    /// name.
    #[error("invalid schema namespace '{schema}': only ASCII letters, digits and '_' are allowed")]
    InvalidSchemaName {
        /// The rejected namespace.
        schema: String,
    },

    /// The underlying SQLite connection failed.
    #[error("remote store failure: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl RemoteStoreError {
    /// Creates an [`RemoteStoreError::ActivityNotFound`] for the given key
    /// parts.
    #[must_use]
    pub fn not_found(database: impl Into<String>, code: impl Into<String>) -> Self {
        Self::ActivityNotFound {
            database: database.into(),
            code: code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_key() {
        let err = RemoteStoreError::not_found("db1", "a7");
        assert_eq!(err.to_string(), "activity db1:a7 not found in remote store");
    }
}
