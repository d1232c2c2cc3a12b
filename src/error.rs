use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::market::MarketError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Business-rule failures reported back to the caller with a readable reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BettingError {
    #[error("match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("match {match_id} is already finished")]
    MatchAlreadyFinished { match_id: String },

    #[error("match {match_id} has been deleted")]
    MatchDeleted { match_id: String },

    #[error("match {match_id} is not open for betting ({status})")]
    MatchNotOpen { match_id: String, status: String },

    #[error("bet {bet_id} not found or already settled")]
    BetNotFoundOrSettled { bet_id: String },

    #[error("user not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("insufficient balance: {available} < {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    #[error("stake {stake} is below the minimum of {minimum}")]
    StakeBelowMinimum { stake: Decimal, minimum: Decimal },

    #[error("selection {index} rejected: {source}")]
    UnsupportedSelection {
        index: usize,
        #[source]
        source: MarketError,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Betting(#[from] BettingError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the failure is internal (storage, I/O) rather than a
    /// user-visible business rejection.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Connection(_) | Self::Database(_) | Self::Parse(_)
        )
    }

    /// Message safe to show to an end user. Internal failures are reduced
    /// to a generic reason; the detail belongs in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "internal error, please retry later".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
