//! Local store trait definition.

use invsync_model::{Activity, ActivityKey, Exchange, Version};

use crate::error::LocalResult;

/// What a version-gated upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed; the incoming one was inserted.
    Created,
    /// An older record existed and was replaced by the incoming one.
    Replaced,
    /// A record at the same or a newer version existed; nothing changed.
    Unchanged,
}

/// The graph-side store the sync engine reads from and pulls into.
///
/// # Invariants
///
/// - `upsert_activity` replaces an existing record only when the incoming
///   version is strictly newer; replacement keeps the record's exchanges.
/// - `upsert_exchange` applies the same rule per edge, where "the same edge"
///   means the `(input, amount, unit, type)` tuple matches.
/// - Once an activity is inserted, `exchanges_of` reflects exactly that
///   activity's exchanges.
///
/// # Implementors
///
/// - [`crate::GraphStore`]: in-memory adjacency map with JSON snapshots.
pub trait LocalStore {
    /// Returns true when an activity with `key` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn activity_exists(&self, key: &ActivityKey) -> LocalResult<bool>;

    /// Returns the stored version of `key`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn activity_version(&self, key: &ActivityKey) -> LocalResult<Option<Version>>;

    /// Returns the activity with `key`.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::LocalStoreError::ActivityNotFound`] when absent.
    fn get_activity(&self, key: &ActivityKey) -> LocalResult<Activity>;

    /// Returns every activity belonging to the logical `database`, in stable
    /// key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn activities_in(&self, database: &str) -> LocalResult<Vec<Activity>>;

    /// Inserts `activity`, or replaces the stored copy when the incoming
    /// version is strictly newer. A stored copy at the same or newer version
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn upsert_activity(&self, activity: Activity) -> LocalResult<UpsertOutcome>;

    /// Returns the exchanges owned by `key`, in insertion order.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::LocalStoreError::ActivityNotFound`] when the
    /// owner is absent.
    fn exchanges_of(&self, key: &ActivityKey) -> LocalResult<Vec<Exchange>>;

    /// Finds an exchange under `owner` whose identity tuple matches
    /// `candidate`, if any.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::LocalStoreError::ActivityNotFound`] when the
    /// owner is absent.
    fn exchange_matching(
        &self,
        owner: &ActivityKey,
        candidate: &Exchange,
    ) -> LocalResult<Option<Exchange>>;

    /// Inserts `exchange` under `owner`, or replaces the matching stored
    /// edge when the incoming version is strictly newer.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::LocalStoreError::ActivityNotFound`] when the
    /// owner is absent, or if the store cannot be written.
    fn upsert_exchange(&self, owner: &ActivityKey, exchange: Exchange) -> LocalResult<UpsertOutcome>;
}
