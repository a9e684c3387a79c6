//! Entity version numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version number of an activity or exchange.
///
/// Versions are caller-supplied, monotonically increasing integers. The
/// absence of an entity is modeled as `Option<Version>::None` at the call
/// sites, which is distinct from `Version::new(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    /// Creates a new version number.
    #[must_use]
    pub const fn new(version: u64) -> Self {
        Self(version)
    }

    /// Returns the raw version value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next version number.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(version: u64) -> Self {
        Self(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        let v1 = Version::new(1);
        let v2 = Version::new(2);
        assert!(v1 < v2);
        assert_eq!(v1, Version::from(1));
    }

    #[test]
    fn version_next() {
        let v = Version::new(5);
        assert_eq!(v.next().as_u64(), 6);
    }

    #[test]
    fn version_display() {
        assert_eq!(format!("{}", Version::new(3)), "v3");
    }

    #[test]
    fn absent_is_not_zero() {
        let absent: Option<Version> = None;
        assert_ne!(absent, Some(Version::new(0)));
    }
}
