//! # invsync Remote Store
//!
//! Relational remote store adapter: the [`RemoteStore`] trait the sync
//! engine pushes through, plus the SQLite-backed [`SqliteStore`]
//! implementation.
//!
//! ## Design Principles
//!
//! - The remote side is row-shaped: four relations (`database`, `activity`,
//!   `activity_database`, `exchange`) plus a joined `activities` view,
//!   namespaced by a schema prefix so several datasets can share one file.
//! - Every mutating call commits on its own. A crash mid-sync leaves a
//!   partially synced but internally consistent store: activities are always
//!   written before the exchanges that reference them.
//! - Database registration is idempotent; registering the same logical
//!   database twice is a no-op, not an error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use invsync_remote::{RemoteStore, SqliteStore};
//! use invsync_model::{Activity, ActivityKey, Version};
//!
//! let store = SqliteStore::open_in_memory("em_lca").unwrap();
//! store.register_database("db1").unwrap();
//! let activity = Activity::new(ActivityKey::new("db1", "a1"), "Fuel production", "GLO", "production", "MJ", Version::new(1));
//! store.insert_activity(&activity).unwrap();
//! assert_eq!(store.activity_version("db1", "a1").unwrap(), Some(Version::new(1)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod sqlite;
mod store;

pub use error::{RemoteResult, RemoteStoreError};
pub use sqlite::SqliteStore;
pub use store::RemoteStore;
