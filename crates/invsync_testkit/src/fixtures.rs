//! Canned networks and store helpers.
//!
//! Provides a small pre-built activity network and a remote store
//! wrapper with automatic cleanup for tests that need a real SQLite
//! file.

use crate::{ActivityBuilder, ExchangeBuilder};
use invsync_local::{GraphStore, LocalStore};
use invsync_model::ActivityKey;
use invsync_remote::SqliteStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Database name used by all canned fixtures.
pub const SAMPLE_DATABASE: &str = "foreground";

/// Keys of the three activities in [`sample_network`].
#[derive(Debug, Clone)]
pub struct SampleKeys {
    /// Electricity production, the top of the chain.
    pub electricity: ActivityKey,
    /// Fuel production, consumed by electricity.
    pub fuel: ActivityKey,
    /// Carbon dioxide, emitted by both producers.
    pub co2: ActivityKey,
}

impl SampleKeys {
    /// Returns the keys of the sample network.
    #[must_use]
    pub fn new() -> Self {
        Self {
            electricity: ActivityKey::new(SAMPLE_DATABASE, "electricity"),
            fuel: ActivityKey::new(SAMPLE_DATABASE, "fuel"),
            co2: ActivityKey::new(SAMPLE_DATABASE, "co2"),
        }
    }
}

impl Default for SampleKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a three-activity network with a shared dependency.
///
/// Electricity consumes fuel and emits carbon dioxide; fuel also
/// emits carbon dioxide. All entities start at version 1.
#[must_use]
pub fn sample_network() -> GraphStore {
    let keys = SampleKeys::new();
    let store = GraphStore::new();

    store
        .upsert_activity(
            ActivityBuilder::new(SAMPLE_DATABASE, "electricity")
                .name("Electricity production")
                .unit("kWh")
                .build(),
        )
        .expect("insert electricity");
    store
        .upsert_activity(
            ActivityBuilder::new(SAMPLE_DATABASE, "fuel")
                .name("Fuel production")
                .unit("MJ")
                .build(),
        )
        .expect("insert fuel");
    store
        .upsert_activity(
            ActivityBuilder::new(SAMPLE_DATABASE, "co2")
                .name("Carbon dioxide")
                .activity_type("biosphere")
                .build(),
        )
        .expect("insert co2");

    store
        .upsert_exchange(
            &keys.electricity,
            ExchangeBuilder::to(SAMPLE_DATABASE, "fuel")
                .amount(2.5)
                .unit("MJ")
                .build(),
        )
        .expect("link electricity to fuel");
    store
        .upsert_exchange(
            &keys.electricity,
            ExchangeBuilder::to(SAMPLE_DATABASE, "co2")
                .amount(0.95)
                .exchange_type("biosphere")
                .build(),
        )
        .expect("link electricity to co2");
    store
        .upsert_exchange(
            &keys.fuel,
            ExchangeBuilder::to(SAMPLE_DATABASE, "co2")
                .amount(0.05)
                .exchange_type("biosphere")
                .build(),
        )
        .expect("link fuel to co2");

    store
}

/// A remote store with automatic cleanup.
pub struct TestRemote {
    /// The store instance.
    pub store: SqliteStore,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestRemote {
    /// Creates a new in-memory remote store under the `test` schema.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            store: SqliteStore::open_in_memory("test").expect("open in-memory remote"),
            _temp_dir: None,
        }
    }

    /// Creates a new file-backed remote store under the `test` schema.
    #[must_use]
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("create temp directory");
        let store = SqliteStore::open(&temp_dir.path().join("remote.db"), "test")
            .expect("open remote file");
        Self {
            store,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database path if file-backed, `None` if in-memory.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("remote.db"))
    }
}

impl std::ops::Deref for TestRemote {
    type Target = SqliteStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test against a fresh in-memory remote store.
pub fn with_remote<F, R>(f: F) -> R
where
    F: FnOnce(&SqliteStore) -> R,
{
    let remote = TestRemote::memory();
    f(&remote.store)
}

/// Scenario helpers for shaped networks.
pub mod scenarios {
    use super::*;

    /// Builds a linear chain `c0000 -> c0001 -> ...` of `len` activities.
    ///
    /// Every link consumes one unit of its successor; the final
    /// activity has no dependencies.
    #[must_use]
    pub fn chain_network(len: usize) -> GraphStore {
        let store = GraphStore::new();
        for i in 0..len {
            let code = format!("c{i:04}");
            store
                .upsert_activity(ActivityBuilder::new(SAMPLE_DATABASE, &code).build())
                .expect("insert chain activity");
            if i > 0 {
                let owner = ActivityKey::new(SAMPLE_DATABASE, format!("c{:04}", i - 1));
                store
                    .upsert_exchange(&owner, ExchangeBuilder::to(SAMPLE_DATABASE, &code).build())
                    .expect("link chain activities");
            }
        }
        store
    }

    /// Builds two activities that consume each other.
    pub fn two_node_cycle() -> (GraphStore, ActivityKey, ActivityKey) {
        let store = GraphStore::new();
        let a = ActivityKey::new(SAMPLE_DATABASE, "a");
        let b = ActivityKey::new(SAMPLE_DATABASE, "b");
        store
            .upsert_activity(ActivityBuilder::new(SAMPLE_DATABASE, "a").build())
            .expect("insert a");
        store
            .upsert_activity(ActivityBuilder::new(SAMPLE_DATABASE, "b").build())
            .expect("insert b");
        store
            .upsert_exchange(&a, ExchangeBuilder::to(SAMPLE_DATABASE, "b").build())
            .expect("link a to b");
        store
            .upsert_exchange(&b, ExchangeBuilder::to(SAMPLE_DATABASE, "a").build())
            .expect("link b to a");
        (store, a, b)
    }
}
