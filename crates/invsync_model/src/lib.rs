//! # invsync Model
//!
//! Entity model shared by every invsync crate: versioned activities (nodes)
//! and exchanges (directed, weighted edges) of a life-cycle inventory graph.
//!
//! ## Design Principles
//!
//! - An [`Activity`] is identified by its [`ActivityKey`], a
//!   `(database, code)` pair. The `database` is a *logical* dataset name,
//!   not a storage location.
//! - An [`Exchange`] has no key of its own; within its owning activity it is
//!   identified by the tuple `(input, amount, unit, type)`.
//! - Every entity carries a caller-supplied [`Version`]. Versions only ever
//!   increase; "no copy exists" is modeled as `Option<Version>::None` and is
//!   distinct from version 0.
//! - Store adapters and the sync engine exchange these types by value; the
//!   model knows nothing about storage.
//!
//! ## Example
//!
//! ```rust
//! use invsync_model::{Activity, ActivityKey, Exchange, Version};
//!
//! let key = ActivityKey::new("db1", "a1");
//! let activity = Activity::new(key.clone(), "Electricity production", "GLO", "production", "kWh", Version::new(1));
//! assert!(activity.validate().is_ok());
//!
//! let exchange = Exchange::new(ActivityKey::new("db1", "a2"), 0.6, "kWh", "technosphere", Version::new(1));
//! assert_ne!(exchange.input, key);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod activity;
mod error;
mod exchange;
mod key;
mod version;

pub use activity::Activity;
pub use error::{ValidationError, ValidationResult};
pub use exchange::{Exchange, DEFAULT_UNCERTAINTY_TYPE};
pub use key::ActivityKey;
pub use version::Version;
