//! User balances and the ledger of movements against them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::UserId;
use super::money::{ensure_representable, Amount};

/// A user's wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub nickname: String,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Open an empty account.
    #[must_use]
    pub fn open(nickname: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            nickname: nickname.into(),
            balance: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }
}

/// Reason for a balance movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Stake deducted at bet placement.
    Stake,
    /// Winnings credited at settlement.
    Payout,
    /// Approved deposit.
    Deposit,
    /// Approved withdrawal.
    Withdrawal,
    /// Tournament registration fee.
    TournamentEntry,
    /// Tournament prize.
    TournamentPrize,
    /// Manual admin adjustment.
    Adjustment,
}

impl LedgerKind {
    /// Whether this kind adds to the balance.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(
            self,
            Self::Payout | Self::Deposit | Self::TournamentPrize | Self::Adjustment
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stake => "stake",
            Self::Payout => "payout",
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::TournamentEntry => "tournament_entry",
            Self::TournamentPrize => "tournament_prize",
            Self::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stake" => Ok(Self::Stake),
            "payout" => Ok(Self::Payout),
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "tournament_entry" => Ok(Self::TournamentEntry),
            "tournament_prize" => Ok(Self::TournamentPrize),
            "adjustment" => Ok(Self::Adjustment),
            other => Err(DomainError::UnknownStatus {
                kind: "ledger",
                value: other.to_string(),
            }),
        }
    }
}

/// One balance movement. `amount` is signed: credits positive, debits negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub kind: LedgerKind,
    pub amount: Amount,
    pub reference: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Build an entry from a positive amount; the sign follows the kind.
    ///
    /// # Errors
    /// Returns [`DomainError::NonPositiveAmount`] if `amount` is not positive,
    /// or [`DomainError::UnrepresentableAmount`] for sub-cent precision.
    pub fn try_new(
        user_id: UserId,
        kind: LedgerKind,
        amount: Amount,
        reference: Option<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount { amount });
        }
        ensure_representable(amount)?;
        let amount = if kind.is_credit() { amount } else { -amount };
        Ok(Self {
            user_id,
            kind,
            amount,
            reference,
            description: description.into(),
            created_at: Utc::now(),
        })
    }

    /// Whether this entry reduces the balance.
    #[must_use]
    pub fn is_debit(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}
