//! Remote store trait definition.

use invsync_model::{Activity, Exchange, Version};

use crate::error::RemoteResult;

/// The row-shaped store the sync engine pushes into and pulls from.
///
/// Activity codes are globally unique on the remote side; logical database
/// membership is a separate relation, which is why version lookups take the
/// `(database, code)` pair while exchange operations work on codes alone.
/// Exchange rows are keyed by `(owner code, input code)`: one edge per
/// input per owner.
///
/// # Invariants
///
/// - Every mutating call commits immediately; no transaction spans more
///   than one logical entity write.
/// - `register_database` is idempotent.
/// - An activity must be inserted before any exchange row referencing it as
///   owner.
///
/// # Implementors
///
/// - [`crate::SqliteStore`]: SQLite file or in-memory database.
pub trait RemoteStore {
    /// Returns true when the logical `database` has been registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn database_registered(&self, database: &str) -> RemoteResult<bool>;

    /// Registers the logical `database`. Registering an already registered
    /// name is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn register_database(&self, database: &str) -> RemoteResult<()>;

    /// Returns the version of activity `code` within `database`, or `None`
    /// when the remote has no such activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn activity_version(&self, database: &str, code: &str) -> RemoteResult<Option<Version>>;

    /// Returns true when the remote holds activity `code` in `database` at
    /// `min_version` or newer.
    ///
    /// This is the gate deciding whether a referenced input activity still
    /// needs to be pushed before an exchange row pointing at it is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn activity_exists(&self, database: &str, code: &str, min_version: Version)
        -> RemoteResult<bool>;

    /// Returns the activity `code` within `database`.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::RemoteStoreError::ActivityNotFound`] when absent.
    fn get_activity(&self, database: &str, code: &str) -> RemoteResult<Activity>;

    /// Returns every activity registered under `database`, in code order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn activities_in(&self, database: &str) -> RemoteResult<Vec<Activity>>;

    /// Inserts a new activity row and its database membership. The caller
    /// must have established that no row for this key exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn insert_activity(&self, activity: &Activity) -> RemoteResult<()>;

    /// Updates the row of an existing activity in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn update_activity(&self, activity: &Activity) -> RemoteResult<()>;

    /// Returns the version of the exchange row `(owner_code, input_code)`,
    /// or `None` when the remote has no such edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn exchange_version(&self, owner_code: &str, input_code: &str)
        -> RemoteResult<Option<Version>>;

    /// Returns the exchange rows owned by `owner_code`, in input order. The
    /// returned input keys are attributed to `database`: the schema stores
    /// input codes only.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn exchanges_of(&self, database: &str, owner_code: &str) -> RemoteResult<Vec<Exchange>>;

    /// Inserts a new exchange row under `owner_code`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn insert_exchange(&self, owner_code: &str, exchange: &Exchange) -> RemoteResult<()>;

    /// Updates the exchange row `(owner_code, exchange.input.code)` in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn update_exchange(&self, owner_code: &str, exchange: &Exchange) -> RemoteResult<()>;
}
