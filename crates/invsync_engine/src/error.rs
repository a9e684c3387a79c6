//! Error types for the sync engine.

use thiserror::Error;

use invsync_local::LocalStoreError;
use invsync_model::{ActivityKey, ValidationError};
use invsync_remote::RemoteStoreError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a sync run.
///
/// Stale versions are deliberately *not* here: a superseded copy is a
/// collected warning, never an error.
#[derive(Error, Debug)]
pub enum SyncError {
    /// An activity lists itself as one of its own exchange inputs.
    #[error("activity {key} lists itself as an exchange input")]
    SelfReferential {
        /// Key of the offending activity.
        key: ActivityKey,
    },

    /// An entity failed structural validation before a store write.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Dependency resolution revisited a key already being resolved on the
    /// current call path.
    #[error("dependency cycle while resolving {key}: {path}")]
    DependencyCycle {
        /// Key whose resolution closed the cycle.
        key: ActivityKey,
        /// The in-flight path, rendered oldest first.
        path: String,
    },

    /// Dependency resolution descended past the depth bound.
    #[error("dependency chain deeper than {max} levels while resolving {key}")]
    DepthExceeded {
        /// Key whose resolution exceeded the bound.
        key: ActivityKey,
        /// The configured bound.
        max: usize,
    },

    /// The local store failed.
    #[error(transparent)]
    Local(#[from] LocalStoreError),

    /// The remote store failed.
    #[error(transparent)]
    Remote(#[from] RemoteStoreError),
}

impl SyncError {
    /// Creates a [`SyncError::SelfReferential`] for `key`.
    #[must_use]
    pub fn self_referential(key: &ActivityKey) -> Self {
        Self::SelfReferential { key: key.clone() }
    }

    /// Creates a [`SyncError::DependencyCycle`] for `key` with the in-flight
    /// path that led to it.
    #[must_use]
    pub fn cycle(key: &ActivityKey, in_flight: &[ActivityKey]) -> Self {
        let mut path = in_flight
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        path.push_str(" -> ");
        path.push_str(&key.to_string());
        Self::DependencyCycle {
            key: key.clone(),
            path,
        }
    }

    /// Returns the key of the entity that caused this error, when one is
    /// attached.
    #[must_use]
    pub fn entity_key(&self) -> Option<&ActivityKey> {
        match self {
            Self::SelfReferential { key }
            | Self::DependencyCycle { key, .. }
            | Self::DepthExceeded { key, .. } => Some(key),
            Self::Invalid(ValidationError::MissingAttribute { key, .. }) => Some(key),
            Self::Invalid(_) | Self::Local(_) | Self::Remote(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_renders_the_path() {
        let a = ActivityKey::new("db1", "a1");
        let b = ActivityKey::new("db1", "a2");
        let err = SyncError::cycle(&a, &[a.clone(), b]);
        assert_eq!(
            err.to_string(),
            "dependency cycle while resolving db1:a1: db1:a1 -> db1:a2 -> db1:a1"
        );
    }

    #[test]
    fn errors_carry_the_entity_key() {
        let key = ActivityKey::new("db1", "a1");
        assert_eq!(
            SyncError::self_referential(&key).entity_key(),
            Some(&key)
        );

        let invalid: SyncError = ValidationError::MissingAttribute {
            key: key.clone(),
            attribute: "unit",
        }
        .into();
        assert_eq!(invalid.entity_key(), Some(&key));
    }

    #[test]
    fn store_errors_pass_through_transparently() {
        let inner = LocalStoreError::not_found(&ActivityKey::new("db1", "a9"));
        let wrapped: SyncError = inner.into();
        assert_eq!(
            wrapped.to_string(),
            "activity db1:a9 not found in local store"
        );
    }
}
