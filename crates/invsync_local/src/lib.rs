//! # invsync Local Store
//!
//! Graph-structured local store adapter: the [`LocalStore`] trait the sync
//! engine writes through, plus the in-memory [`GraphStore`] implementation
//! with JSON snapshot persistence.
//!
//! ## Design Principles
//!
//! - The store is an adjacency map: one record per activity key, each record
//!   owning its outgoing exchanges. Reads and writes for one activity and
//!   its exchanges are always consistent.
//! - Upserts are version-gated: an existing record is replaced only when the
//!   incoming version is strictly newer, otherwise it is left untouched.
//!   Deciding whether a stale incoming copy deserves a warning is the
//!   caller's job.
//! - Replacing an activity record keeps its exchange list; edges have their
//!   own versions and are reconciled one at a time.
//!
//! ## Example
//!
//! ```rust
//! use invsync_local::{GraphStore, LocalStore, UpsertOutcome};
//! use invsync_model::{Activity, ActivityKey, Version};
//!
//! let store = GraphStore::new();
//! let key = ActivityKey::new("db1", "a1");
//! let activity = Activity::new(key.clone(), "Fuel production", "GLO", "production", "MJ", Version::new(1));
//! assert_eq!(store.upsert_activity(activity).unwrap(), UpsertOutcome::Created);
//! assert!(store.activity_exists(&key).unwrap());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod graph;
mod snapshot;
mod store;

pub use error::{LocalStoreError, LocalResult};
pub use graph::GraphStore;
pub use store::{LocalStore, UpsertOutcome};
