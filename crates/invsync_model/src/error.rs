//! Validation errors for model entities.

use thiserror::Error;

use crate::key::ActivityKey;

/// Result type for entity validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A structural defect in an entity that must be caught before the entity is
/// written to a store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required activity attribute is empty.
    #[error("activity {key} is missing required attribute '{attribute}'")]
    MissingAttribute {
        /// Key of the offending activity.
        key: ActivityKey,
        /// Name of the empty attribute.
        attribute: &'static str,
    },

    /// A required exchange attribute is empty.
    #[error("exchange to {input} is missing required attribute '{attribute}'")]
    MissingExchangeAttribute {
        /// Input key of the offending exchange.
        input: ActivityKey,
        /// Name of the empty attribute.
        attribute: &'static str,
    },

    /// An exchange amount is NaN or infinite.
    #[error("exchange to {input} has non-finite amount {amount}")]
    NonFiniteAmount {
        /// Input key of the offending exchange.
        input: ActivityKey,
        /// The rejected amount.
        amount: f64,
    },
}
