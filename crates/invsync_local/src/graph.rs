//! In-memory graph store.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use parking_lot::RwLock;

use invsync_model::{Activity, ActivityKey, Exchange, Version};

use crate::error::{LocalResult, LocalStoreError};
use crate::store::{LocalStore, UpsertOutcome};

/// One activity record together with its outgoing exchanges.
#[derive(Debug, Clone)]
struct Node {
    activity: Activity,
    exchanges: Vec<Exchange>,
}

/// An in-memory graph-structured store.
///
/// Activities live in an ordered adjacency map keyed by [`ActivityKey`];
/// each record owns its outgoing exchanges. The map is ordered so iteration
/// and snapshots are deterministic.
///
/// The store is cheap to clone record-by-record and can be persisted to a
/// JSON snapshot via [`GraphStore::save`] / [`GraphStore::load`].
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: RwLock<BTreeMap<ActivityKey, Node>>,
}

impl GraphStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of activities in the store.
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// Returns the number of exchanges across all activities.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.nodes.read().values().map(|n| n.exchanges.len()).sum()
    }

    /// Returns true when the store holds no activities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Returns the distinct logical database names present, sorted.
    #[must_use]
    pub fn databases(&self) -> Vec<String> {
        let nodes = self.nodes.read();
        let set: BTreeSet<&str> = nodes.keys().map(|k| k.database.as_str()).collect();
        set.into_iter().map(str::to_owned).collect()
    }

    /// Removes every exchange under `owner` that points at `input`.
    ///
    /// Returns the number of removed edges; a missing owner counts as zero
    /// removals rather than an error, so callers can treat "nothing matched"
    /// uniformly.
    pub fn remove_exchanges_to(&self, owner: &ActivityKey, input: &ActivityKey) -> usize {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(owner) {
            Some(node) => {
                let before = node.exchanges.len();
                node.exchanges.retain(|e| e.input != *input);
                before - node.exchanges.len()
            }
            None => 0,
        }
    }

    /// Exports every record in key order, for snapshots and inspection.
    pub(crate) fn export_records(&self) -> Vec<(Activity, Vec<Exchange>)> {
        self.nodes
            .read()
            .values()
            .map(|n| (n.activity.clone(), n.exchanges.clone()))
            .collect()
    }

    /// Rebuilds a store from exported records.
    pub(crate) fn from_records(records: Vec<(Activity, Vec<Exchange>)>) -> Self {
        let mut nodes = BTreeMap::new();
        for (activity, exchanges) in records {
            nodes.insert(activity.key.clone(), Node { activity, exchanges });
        }
        Self {
            nodes: RwLock::new(nodes),
        }
    }
}

impl LocalStore for GraphStore {
    fn activity_exists(&self, key: &ActivityKey) -> LocalResult<bool> {
        Ok(self.nodes.read().contains_key(key))
    }

    fn activity_version(&self, key: &ActivityKey) -> LocalResult<Option<Version>> {
        Ok(self.nodes.read().get(key).map(|n| n.activity.version))
    }

    fn get_activity(&self, key: &ActivityKey) -> LocalResult<Activity> {
        self.nodes
            .read()
            .get(key)
            .map(|n| n.activity.clone())
            .ok_or_else(|| LocalStoreError::not_found(key))
    }

    fn activities_in(&self, database: &str) -> LocalResult<Vec<Activity>> {
        Ok(self
            .nodes
            .read()
            .values()
            .filter(|n| n.activity.key.database == database)
            .map(|n| n.activity.clone())
            .collect())
    }

    fn upsert_activity(&self, activity: Activity) -> LocalResult<UpsertOutcome> {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&activity.key) {
            None => {
                nodes.insert(
                    activity.key.clone(),
                    Node {
                        activity,
                        exchanges: Vec::new(),
                    },
                );
                Ok(UpsertOutcome::Created)
            }
            Some(node) if node.activity.version < activity.version => {
                // Replace the record, keep the edges: they carry their own
                // versions and are reconciled individually.
                node.activity = activity;
                Ok(UpsertOutcome::Replaced)
            }
            Some(_) => Ok(UpsertOutcome::Unchanged),
        }
    }

    fn exchanges_of(&self, key: &ActivityKey) -> LocalResult<Vec<Exchange>> {
        self.nodes
            .read()
            .get(key)
            .map(|n| n.exchanges.clone())
            .ok_or_else(|| LocalStoreError::not_found(key))
    }

    fn exchange_matching(
        &self,
        owner: &ActivityKey,
        candidate: &Exchange,
    ) -> LocalResult<Option<Exchange>> {
        let nodes = self.nodes.read();
        let node = nodes.get(owner).ok_or_else(|| LocalStoreError::not_found(owner))?;
        Ok(node.exchanges.iter().find(|e| e.matches(candidate)).cloned())
    }

    fn upsert_exchange(&self, owner: &ActivityKey, exchange: Exchange) -> LocalResult<UpsertOutcome> {
        let mut nodes = self.nodes.write();
        let node = nodes.get_mut(owner).ok_or_else(|| LocalStoreError::not_found(owner))?;
        match node.exchanges.iter_mut().find(|e| e.matches(&exchange)) {
            None => {
                node.exchanges.push(exchange);
                Ok(UpsertOutcome::Created)
            }
            Some(existing) if existing.version < exchange.version => {
                *existing = exchange;
                Ok(UpsertOutcome::Replaced)
            }
            Some(_) => Ok(UpsertOutcome::Unchanged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invsync_model::Version;

    fn activity(db: &str, code: &str, version: u64) -> Activity {
        Activity::new(
            ActivityKey::new(db, code),
            format!("activity {code}"),
            "GLO",
            "production",
            "kg",
            Version::new(version),
        )
    }

    fn exchange(db: &str, code: &str, amount: f64, version: u64) -> Exchange {
        Exchange::new(
            ActivityKey::new(db, code),
            amount,
            "kg",
            "technosphere",
            Version::new(version),
        )
    }

    #[test]
    fn upsert_creates_when_absent() {
        let store = GraphStore::new();
        let outcome = store.upsert_activity(activity("db1", "a1", 1)).unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);
        assert!(store.activity_exists(&ActivityKey::new("db1", "a1")).unwrap());
    }

    #[test]
    fn upsert_replaces_only_when_strictly_newer() {
        let store = GraphStore::new();
        store.upsert_activity(activity("db1", "a1", 2)).unwrap();

        let same = store.upsert_activity(activity("db1", "a1", 2)).unwrap();
        assert_eq!(same, UpsertOutcome::Unchanged);

        let older = store.upsert_activity(activity("db1", "a1", 1)).unwrap();
        assert_eq!(older, UpsertOutcome::Unchanged);

        let newer = store.upsert_activity(activity("db1", "a1", 3)).unwrap();
        assert_eq!(newer, UpsertOutcome::Replaced);

        let key = ActivityKey::new("db1", "a1");
        assert_eq!(store.activity_version(&key).unwrap(), Some(Version::new(3)));
    }

    #[test]
    fn replacing_activity_keeps_exchanges() {
        let store = GraphStore::new();
        let key = ActivityKey::new("db1", "a1");
        store.upsert_activity(activity("db1", "a1", 1)).unwrap();
        store
            .upsert_exchange(&key, exchange("db1", "a2", 0.5, 1))
            .unwrap();

        store.upsert_activity(activity("db1", "a1", 2)).unwrap();
        assert_eq!(store.exchanges_of(&key).unwrap().len(), 1);
    }

    #[test]
    fn get_missing_activity_fails() {
        let store = GraphStore::new();
        let err = store.get_activity(&ActivityKey::new("db1", "nope")).unwrap_err();
        assert!(matches!(err, LocalStoreError::ActivityNotFound { .. }));
    }

    #[test]
    fn exchanges_are_scoped_to_their_owner() {
        let store = GraphStore::new();
        let a1 = ActivityKey::new("db1", "a1");
        let a2 = ActivityKey::new("db1", "a2");
        store.upsert_activity(activity("db1", "a1", 1)).unwrap();
        store.upsert_activity(activity("db1", "a2", 1)).unwrap();
        store.upsert_exchange(&a1, exchange("db1", "a2", 0.5, 1)).unwrap();

        assert_eq!(store.exchanges_of(&a1).unwrap().len(), 1);
        assert!(store.exchanges_of(&a2).unwrap().is_empty());
    }

    #[test]
    fn exchange_upsert_follows_version_rule() {
        let store = GraphStore::new();
        let owner = ActivityKey::new("db1", "a1");
        store.upsert_activity(activity("db1", "a1", 1)).unwrap();

        let created = store.upsert_exchange(&owner, exchange("db1", "a2", 0.5, 1)).unwrap();
        assert_eq!(created, UpsertOutcome::Created);

        let unchanged = store.upsert_exchange(&owner, exchange("db1", "a2", 0.5, 1)).unwrap();
        assert_eq!(unchanged, UpsertOutcome::Unchanged);

        let replaced = store.upsert_exchange(&owner, exchange("db1", "a2", 0.5, 4)).unwrap();
        assert_eq!(replaced, UpsertOutcome::Replaced);

        let stored = store.exchanges_of(&owner).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].version, Version::new(4));
    }

    #[test]
    fn different_amount_is_a_new_edge() {
        let store = GraphStore::new();
        let owner = ActivityKey::new("db1", "a1");
        store.upsert_activity(activity("db1", "a1", 1)).unwrap();

        store.upsert_exchange(&owner, exchange("db1", "a2", 0.5, 1)).unwrap();
        store.upsert_exchange(&owner, exchange("db1", "a2", 0.7, 1)).unwrap();
        assert_eq!(store.exchanges_of(&owner).unwrap().len(), 2);
    }

    #[test]
    fn exchange_matching_finds_the_tuple() {
        let store = GraphStore::new();
        let owner = ActivityKey::new("db1", "a1");
        store.upsert_activity(activity("db1", "a1", 1)).unwrap();
        store.upsert_exchange(&owner, exchange("db1", "a2", 0.5, 3)).unwrap();

        let probe = exchange("db1", "a2", 0.5, 9);
        let found = store.exchange_matching(&owner, &probe).unwrap();
        assert_eq!(found.map(|e| e.version), Some(Version::new(3)));

        let miss = exchange("db1", "a3", 0.5, 9);
        assert!(store.exchange_matching(&owner, &miss).unwrap().is_none());
    }

    #[test]
    fn upsert_exchange_without_owner_fails() {
        let store = GraphStore::new();
        let owner = ActivityKey::new("db1", "ghost");
        let err = store
            .upsert_exchange(&owner, exchange("db1", "a2", 1.0, 1))
            .unwrap_err();
        assert!(matches!(err, LocalStoreError::ActivityNotFound { .. }));
    }

    #[test]
    fn activities_in_filters_by_database() {
        let store = GraphStore::new();
        store.upsert_activity(activity("db1", "a1", 1)).unwrap();
        store.upsert_activity(activity("db2", "b1", 1)).unwrap();

        let db1 = store.activities_in("db1").unwrap();
        assert_eq!(db1.len(), 1);
        assert_eq!(db1[0].key.code, "a1");
        assert_eq!(store.databases(), vec!["db1".to_string(), "db2".to_string()]);
    }

    #[test]
    fn remove_exchanges_to_counts_removals() {
        let store = GraphStore::new();
        let owner = ActivityKey::new("db1", "a1");
        store.upsert_activity(activity("db1", "a1", 1)).unwrap();
        store.upsert_exchange(&owner, exchange("db1", "a2", 0.5, 1)).unwrap();
        store.upsert_exchange(&owner, exchange("db1", "a2", 0.9, 1)).unwrap();
        store.upsert_exchange(&owner, exchange("db1", "a3", 1.0, 1)).unwrap();

        let removed = store.remove_exchanges_to(&owner, &ActivityKey::new("db1", "a2"));
        assert_eq!(removed, 2);
        assert_eq!(store.exchanges_of(&owner).unwrap().len(), 1);

        let none = store.remove_exchanges_to(&ActivityKey::new("db1", "ghost"), &owner);
        assert_eq!(none, 0);
    }
}
