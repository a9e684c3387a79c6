//! Fluent builders for test entities.

use invsync_model::{Activity, ActivityKey, Exchange, Version};

/// Builds an [`Activity`] with sensible test defaults.
///
/// Defaults: name derived from the code, location `GLO`, type
/// `production`, unit `kg`, version 1.
#[derive(Debug, Clone)]
pub struct ActivityBuilder {
    activity: Activity,
}

impl ActivityBuilder {
    /// Starts a builder for `(database, code)`.
    #[must_use]
    pub fn new(database: &str, code: &str) -> Self {
        Self {
            activity: Activity::new(
                ActivityKey::new(database, code),
                format!("activity {code}"),
                "GLO",
                "production",
                "kg",
                Version::new(1),
            ),
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.activity.name = name.to_owned();
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn location(mut self, location: &str) -> Self {
        self.activity.location = location.to_owned();
        self
    }

    /// Sets the activity type.
    #[must_use]
    pub fn activity_type(mut self, activity_type: &str) -> Self {
        self.activity.activity_type = activity_type.to_owned();
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn unit(mut self, unit: &str) -> Self {
        self.activity.unit = unit.to_owned();
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn version(mut self, version: u64) -> Self {
        self.activity.version = Version::new(version);
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: &str) -> Self {
        self.activity.comment = Some(comment.to_owned());
        self
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> Activity {
        self.activity
    }
}

/// Builds an [`Exchange`] with sensible test defaults.
///
/// Defaults: amount 1.0, unit `kg`, type `technosphere`, version 1.
#[derive(Debug, Clone)]
pub struct ExchangeBuilder {
    exchange: Exchange,
}

impl ExchangeBuilder {
    /// Starts a builder for an edge pointing at `(database, code)`.
    #[must_use]
    pub fn to(database: &str, code: &str) -> Self {
        Self {
            exchange: Exchange::new(
                ActivityKey::new(database, code),
                1.0,
                "kg",
                "technosphere",
                Version::new(1),
            ),
        }
    }

    /// Sets the amount.
    #[must_use]
    pub fn amount(mut self, amount: f64) -> Self {
        self.exchange.amount = amount;
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn unit(mut self, unit: &str) -> Self {
        self.exchange.unit = unit.to_owned();
        self
    }

    /// Sets the exchange type.
    #[must_use]
    pub fn exchange_type(mut self, exchange_type: &str) -> Self {
        self.exchange.exchange_type = exchange_type.to_owned();
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn version(mut self, version: u64) -> Self {
        self.exchange.version = Version::new(version);
        self
    }

    /// Finishes the build.
    #[must_use]
    pub fn build(self) -> Exchange {
        self.exchange
    }
}
