//! Activity records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::key::ActivityKey;
use crate::version::Version;

/// A node in the inventory graph: a process or flow with a stable identity
/// and a caller-supplied version.
///
/// Equality covers every attribute, so two copies of the same activity at
/// different versions compare unequal. Version comparison between copies is
/// the sync engine's concern, not the model's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Identity of the activity.
    pub key: ActivityKey,
    /// Human-readable name.
    pub name: String,
    /// Geographic location code (e.g. `GLO`, `RER`).
    pub location: String,
    /// Activity type, e.g. `production` or `biosphere`.
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Unit of the activity's reference flow.
    pub unit: String,
    /// Version of this copy.
    pub version: Version,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Activity {
    /// Creates a new activity with no comment.
    #[must_use]
    pub fn new(
        key: ActivityKey,
        name: impl Into<String>,
        location: impl Into<String>,
        activity_type: impl Into<String>,
        unit: impl Into<String>,
        version: Version,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            location: location.into(),
            activity_type: activity_type.into(),
            unit: unit.into(),
            version,
            comment: None,
        }
    }

    /// Attaches a comment, builder style.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Checks the attributes every store requires before an insert.
    ///
    /// `name`, `location`, `type` and `unit` must be non-empty. The version
    /// is total by construction and needs no check.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAttribute`] naming the first empty
    /// attribute.
    pub fn validate(&self) -> ValidationResult<()> {
        for (attribute, value) in [
            ("name", &self.name),
            ("location", &self.location),
            ("type", &self.activity_type),
            ("unit", &self.unit),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingAttribute {
                    key: self.key.clone(),
                    attribute,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' {}", self.key, self.name, self.version)
    }
}
