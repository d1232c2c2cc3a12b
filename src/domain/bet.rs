//! Parlay bet slips and their selections.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{BetId, MatchId, UserId};
use super::money::{ensure_representable, Amount, Odd};
use super::odds::{combined_odd, potential_win};

/// Result of a single selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionResult {
    #[default]
    Pending,
    Won,
    Lost,
}

impl SelectionResult {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

impl fmt::Display for SelectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionResult {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(DomainError::UnknownStatus {
                kind: "selection",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a bet. `Won` and `Lost` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    #[default]
    Pending,
    Won,
    Lost,
}

impl BetStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(DomainError::UnknownStatus {
                kind: "bet",
                value: other.to_string(),
            }),
        }
    }
}

/// Selection as supplied by the placement request, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSelection {
    #[serde(default)]
    pub match_id: String,
    #[serde(default)]
    pub market_key: String,
    #[serde(default)]
    pub selection_key: String,
    #[serde(default)]
    pub odd: Option<Decimal>,
    #[serde(default)]
    pub label: Option<String>,
}

/// One leg of a parlay.
///
/// The odd is fixed at placement and never re-priced from the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub match_id: MatchId,
    pub market_key: String,
    pub selection_key: String,
    pub odd: Odd,
    pub label: String,
    pub result: SelectionResult,
}

impl Selection {
    fn try_from_new(index: usize, new: NewSelection) -> Result<Self, DomainError> {
        let required = |value: &str, field: &'static str| {
            if value.trim().is_empty() {
                Err(DomainError::MissingSelectionField { index, field })
            } else {
                Ok(())
            }
        };
        required(&new.match_id, "match id")?;
        required(&new.market_key, "market key")?;
        required(&new.selection_key, "selection key")?;

        let odd = new.odd.ok_or(DomainError::MissingSelectionField {
            index,
            field: "odd",
        })?;
        if odd <= Decimal::ZERO {
            return Err(DomainError::NonPositiveOdd { index, odd });
        }

        let label = new
            .label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| format!("{}: {}", new.market_key, new.selection_key));

        Ok(Self {
            match_id: MatchId::from(new.match_id),
            market_key: new.market_key,
            selection_key: new.selection_key,
            odd,
            label,
            result: SelectionResult::Pending,
        })
    }
}

/// A parlay bet slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    id: BetId,
    user_id: UserId,
    selections: Vec<Selection>,
    stake: Amount,
    combined_odd: Odd,
    potential_win: Amount,
    status: BetStatus,
    is_paid: bool,
    created_at: DateTime<Utc>,
}

impl Bet {
    /// Validate a placement request and price the slip.
    ///
    /// # Errors
    /// Returns a [`DomainError`] for an empty slip, malformed selections, a
    /// non-positive stake, or a stake or potential win the ledger cannot hold.
    pub fn try_new(
        user_id: UserId,
        selections: Vec<NewSelection>,
        stake: Amount,
    ) -> Result<Self, DomainError> {
        if selections.is_empty() {
            return Err(DomainError::EmptySelections);
        }
        if stake <= Decimal::ZERO {
            return Err(DomainError::NonPositiveStake { stake });
        }
        ensure_representable(stake)?;

        let selections = selections
            .into_iter()
            .enumerate()
            .map(|(index, new)| Selection::try_from_new(index, new))
            .collect::<Result<Vec<_>, _>>()?;

        let combined_odd = combined_odd(selections.iter().map(|s| Some(s.odd)));
        let potential_win = potential_win(stake, combined_odd);
        ensure_representable(potential_win)?;

        Ok(Self {
            id: BetId::new(),
            user_id,
            selections,
            stake,
            combined_odd,
            potential_win,
            status: BetStatus::Pending,
            is_paid: false,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a bet from persisted parts.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn restore(
        id: BetId,
        user_id: UserId,
        selections: Vec<Selection>,
        stake: Amount,
        combined_odd: Odd,
        potential_win: Amount,
        status: BetStatus,
        is_paid: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            selections,
            stake,
            combined_odd,
            potential_win,
            status,
            is_paid,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &BetId {
        &self.id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    #[must_use]
    pub fn stake(&self) -> Amount {
        self.stake
    }

    #[must_use]
    pub fn combined_odd(&self) -> Odd {
        self.combined_odd
    }

    #[must_use]
    pub fn potential_win(&self) -> Amount {
        self.potential_win
    }

    #[must_use]
    pub fn status(&self) -> BetStatus {
        self.status
    }

    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.is_paid
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether any selection references the given match.
    #[must_use]
    pub fn references(&self, match_id: &MatchId) -> bool {
        self.selections.iter().any(|s| &s.match_id == match_id)
    }

    /// Distinct match ids referenced by this slip, in selection order.
    #[must_use]
    pub fn match_ids(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> = Vec::with_capacity(self.selections.len());
        for selection in &self.selections {
            if !ids.contains(&selection.match_id) {
                ids.push(selection.match_id.clone());
            }
        }
        ids
    }

    pub(super) fn selections_mut(&mut self) -> &mut [Selection] {
        &mut self.selections
    }

    /// Move the bet to a new status. Terminal statuses never revert and
    /// `is_paid` only moves false to true on a won bet.
    pub(super) fn transition(&mut self, status: BetStatus, paid: bool) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        if paid && status == BetStatus::Won {
            self.is_paid = true;
        }
    }
}
