//! Domain validation errors for core domain types.
//!
//! This module defines errors that occur when domain invariants are violated.
//! These errors are returned by `try_new` constructors and parsers that
//! validate inputs.
//!
//! # Examples
//!
//! ```
//! use parlay::domain::error::DomainError;
//! use parlay::domain::fixture::Score;
//!
//! let result = Score::try_new(-1, 2);
//! assert!(matches!(result, Err(DomainError::NegativeGoals { value: -1 })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Goal counts are non-negative integers.
    #[error("goal count must be non-negative, got {value}")]
    NegativeGoals {
        /// The invalid goal count that was provided.
        value: i64,
    },

    /// Goal counts must fit the stored 32-bit range.
    #[error("goal count {value} is out of range")]
    GoalsOutOfRange {
        /// The invalid goal count that was provided.
        value: i64,
    },

    /// A bet needs at least one selection.
    #[error("selections cannot be empty")]
    EmptySelections,

    /// A selection is missing a required field.
    #[error("selection {index} is missing {field}")]
    MissingSelectionField {
        /// Position of the selection in the slip.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A match is missing a required field.
    #[error("match is missing {field}")]
    MissingMatchField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Selection odds must be positive.
    #[error("selection {index} odd must be positive, got {odd}")]
    NonPositiveOdd {
        /// Position of the selection in the slip.
        index: usize,
        /// The invalid odd.
        odd: Decimal,
    },

    /// Stake must be positive.
    #[error("stake must be positive, got {stake}")]
    NonPositiveStake {
        /// The invalid stake.
        stake: Decimal,
    },

    /// Ledger amounts must be positive; direction is given by the entry kind.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// Amount has more precision than the ledger can hold.
    #[error("amount {amount} exceeds 2 decimal places or ledger range")]
    UnrepresentableAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// A stored or supplied status string is not recognised.
    #[error("unknown {kind} status '{value}'")]
    UnknownStatus {
        /// Which status enum was being parsed.
        kind: &'static str,
        /// The unrecognised value.
        value: String,
    },
}
