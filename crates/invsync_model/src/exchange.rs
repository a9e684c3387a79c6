//! Exchange records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::key::ActivityKey;
use crate::version::Version;

/// Uncertainty type recorded when a data source does not specify one.
pub const DEFAULT_UNCERTAINTY_TYPE: u32 = 0;

/// A directed edge from an owning activity to an input activity.
///
/// Exchanges carry no key of their own. Within an owner, two exchanges are
/// the same edge only when `input`, `amount`, `unit` and `type` all match;
/// [`Exchange::matches`] implements exactly that tuple comparison. Amounts
/// are caller-supplied data, never computed, so exact `f64` equality is the
/// intended comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    /// Key of the input activity this edge points at.
    pub input: ActivityKey,
    /// Quantity of the input consumed or produced.
    pub amount: f64,
    /// Unit of the amount.
    pub unit: String,
    /// Exchange type, e.g. `production`, `technosphere` or `biosphere`.
    #[serde(rename = "type")]
    pub exchange_type: String,
    /// Uncertainty distribution selector; [`DEFAULT_UNCERTAINTY_TYPE`] when
    /// the source had none.
    #[serde(default = "default_uncertainty")]
    pub uncertainty_type: u32,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Version of this copy.
    pub version: Version,
}

const fn default_uncertainty() -> u32 {
    DEFAULT_UNCERTAINTY_TYPE
}

impl Exchange {
    /// Creates a new exchange with the default uncertainty type and no
    /// comment.
    #[must_use]
    pub fn new(
        input: ActivityKey,
        amount: f64,
        unit: impl Into<String>,
        exchange_type: impl Into<String>,
        version: Version,
    ) -> Self {
        Self {
            input,
            amount,
            unit: unit.into(),
            exchange_type: exchange_type.into(),
            uncertainty_type: DEFAULT_UNCERTAINTY_TYPE,
            comment: None,
            version,
        }
    }

    /// Sets the uncertainty type, builder style.
    #[must_use]
    pub fn with_uncertainty_type(mut self, uncertainty_type: u32) -> Self {
        self.uncertainty_type = uncertainty_type;
        self
    }

    /// Attaches a comment, builder style.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns true when `other` is the same edge: input key, amount, unit
    /// and type all equal. Version, uncertainty and comment are payload, not
    /// identity.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.input == other.input
            && self.amount == other.amount
            && self.unit == other.unit
            && self.exchange_type == other.exchange_type
    }

    /// Checks the attributes every store requires before an insert.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when `unit` or `type` is empty or the
    /// amount is NaN/infinite.
    pub fn validate(&self) -> ValidationResult<()> {
        if !self.amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount {
                input: self.input.clone(),
                amount: self.amount,
            });
        }
        for (attribute, value) in [("unit", &self.unit), ("type", &self.exchange_type)] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingExchangeAttribute {
                    input: self.input.clone(),
                    attribute,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} -> {} {}",
            self.exchange_type, self.amount, self.unit, self.input, self.version
        )
    }
}
