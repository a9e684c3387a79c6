//! Activity identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an activity: a `(database, code)` pair.
///
/// `database` names the logical dataset the activity belongs to; `code` is
/// unique within that database. Keys are compared field-by-field and hash
/// cheaply, so they double as map keys in the graph store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityKey {
    /// Logical database the activity belongs to.
    pub database: String,
    /// Code unique within the database.
    pub code: String,
}

impl ActivityKey {
    /// Creates a new activity key.
    #[must_use]
    pub fn new(database: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ActivityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.database, self.code)
    }
}

impl From<(&str, &str)> for ActivityKey {
    fn from((database, code): (&str, &str)) -> Self {
        Self::new(database, code)
    }
}

impl From<(String, String)> for ActivityKey {
    fn from((database, code): (String, String)) -> Self {
        Self { database, code }
    }
}
