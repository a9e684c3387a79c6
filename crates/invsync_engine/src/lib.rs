//! # invsync Engine
//!
//! Version-based push/pull synchronization between a graph-structured local
//! store and a relational remote store.
//!
//! ## How a run works
//!
//! One [`SyncEngine::sync`] call runs up to two independent passes over one
//! logical database:
//!
//! 1. **Push** (local to remote): each local activity is reconciled against
//!    the remote via [`resolve`], then every one of its exchanges is
//!    written, recursively pushing any input activity the remote does not
//!    yet hold at the needed version.
//! 2. **Pull** (remote to local): symmetric, with the input-existence gate
//!    on the local side and exchange identity decided by
//!    `(input, amount, unit, type)` matching.
//!
//! Conflicts resolve last-writer-wins by version number. Superseded copies
//! are never overwritten: they produce [`StaleWarning`]s collected in the
//! run's [`SyncReport`]. Self-references, dependency cycles (detected via an
//! explicit in-flight key path), missing entities and store failures are
//! fatal and abort the run.
//!
//! ## Example
//!
//! ```rust
//! use invsync_engine::{SyncEngine, SyncOptions};
//! use invsync_local::{GraphStore, LocalStore};
//! use invsync_model::{Activity, ActivityKey, Version};
//! use invsync_remote::SqliteStore;
//!
//! let local = GraphStore::new();
//! local
//!     .upsert_activity(Activity::new(
//!         ActivityKey::new("db1", "a1"),
//!         "Fuel production",
//!         "GLO",
//!         "production",
//!         "MJ",
//!         Version::new(1),
//!     ))
//!     .unwrap();
//!
//! let remote = SqliteStore::open_in_memory("em_lca").unwrap();
//! let engine = SyncEngine::new(local, remote, "db1");
//! let report = engine.sync(SyncOptions::default()).unwrap();
//! assert_eq!(report.push.activities_created, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod report;
mod resolver;

pub use engine::{SyncEngine, SyncOptions, MAX_RESOLVE_DEPTH};
pub use error::{SyncError, SyncResult};
pub use report::{PassStats, StaleEntity, StaleWarning, SyncDirection, SyncReport};
pub use resolver::{resolve, SyncAction};
