//! Import error types.

use std::path::PathBuf;

use thiserror::Error;

use invsync_local::LocalStoreError;
use invsync_model::ValidationError;

/// Errors raised while loading a template or assembling a database.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The template file could not be read.
    #[error("cannot read template {path}: {source}")]
    TemplateIo {
        /// Path of the template file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The template file is not valid YAML for the expected tables.
    #[error("cannot parse template {path}: {source}")]
    TemplateFormat {
        /// Path of the template file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_yaml::Error,
    },

    /// A template row failed a loader-side check.
    #[error("{table} row {row}: {problem}")]
    InvalidRow {
        /// Table the row belongs to.
        table: &'static str,
        /// Zero-based row index within the table.
        row: usize,
        /// What is wrong with the row.
        problem: String,
    },

    /// `add_exchanges` rows name owning activities that were never created
    /// and carry no explicit code.
    #[error("add_exchanges references activities never created: {owners}")]
    UnknownOwners {
        /// Comma-separated orphan activity names.
        owners: String,
    },

    /// An exchange input matched no created activity and had no explicit
    /// code.
    #[error("no code for exchange '{exchange}' from '{database}' under activity '{activity}'")]
    UnresolvedInput {
        /// Name of the owning activity.
        activity: String,
        /// Name of the unresolved input.
        exchange: String,
        /// Database the input was looked up in.
        database: String,
    },

    /// A `copy_activities` row names a source database absent from the local
    /// store.
    #[error("copy source database '{database}' is not in the local store")]
    MissingSourceDatabase {
        /// The absent database name.
        database: String,
    },

    /// An assembled activity failed attribute validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The local store rejected a read or write.
    #[error(transparent)]
    Local(#[from] LocalStoreError),
}

/// Result alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
