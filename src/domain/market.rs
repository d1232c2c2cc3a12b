//! Market rules for resolving a single selection against a final score.
//!
//! Supported markets:
//!
//! | Market | Selection keys | Won when |
//! |---|---|---|
//! | `1X2` | `home` / `away` / `draw` | home>away / away>home / home==away |
//! | `GG` | `yes`,`gg` / `no`,`ng` | both scored / at least one blank |
//! | `OU` | `over_<line>` / `under_<line>` | total>line / total<line |
//! | `DC` | `1X` / `12` / `X2` | home>=away / home!=away / away>=home |
//!
//! Market keys are case-insensitive. Anything unrecognised resolves to
//! lost through [`evaluate_selection`]; [`resolve`] exposes the reason.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::fixture::Score;

/// Over/under line used when a key carries no explicit line (`over_`).
pub const DEFAULT_TOTALS_LINE: Decimal = dec!(2.5);

/// Betting market type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Full-time result: home, draw, away.
    MatchResult,
    /// Both teams to score.
    BothTeamsScore,
    /// Total goals over/under a line.
    Totals,
    /// Double chance.
    DoubleChance,
}

impl Market {
    /// Parse a market key, case-insensitively.
    ///
    /// # Errors
    /// Returns [`MarketError::UnknownMarket`] for unsupported keys.
    pub fn parse(market_key: &str) -> Result<Self, MarketError> {
        let key = market_key.trim().to_ascii_uppercase();
        match key.as_str() {
            "1X2" => Ok(Self::MatchResult),
            "GG" | "GG/NG" => Ok(Self::BothTeamsScore),
            "OU" => Ok(Self::Totals),
            k if k.starts_with("O/U") => Ok(Self::Totals),
            "DC" => Ok(Self::DoubleChance),
            _ => Err(MarketError::UnknownMarket {
                market_key: market_key.to_string(),
            }),
        }
    }

    /// Canonical market key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MatchResult => "1X2",
            Self::BothTeamsScore => "GG",
            Self::Totals => "OU",
            Self::DoubleChance => "DC",
        }
    }

    /// Parse a selection key within this market.
    ///
    /// # Errors
    /// Returns [`MarketError::UnknownSelection`] or [`MarketError::InvalidLine`].
    pub fn pick(self, selection_key: &str) -> Result<Pick, MarketError> {
        let unknown = || MarketError::UnknownSelection {
            market: self,
            selection_key: selection_key.to_string(),
        };
        let raw = selection_key.trim();

        match self {
            Self::MatchResult => match raw.to_ascii_lowercase().as_str() {
                "home" => Ok(Pick::Home),
                "away" => Ok(Pick::Away),
                "draw" => Ok(Pick::Draw),
                _ => Err(unknown()),
            },
            Self::BothTeamsScore => match raw.to_ascii_lowercase().as_str() {
                "yes" | "gg" => Ok(Pick::BothScore),
                "no" | "ng" => Ok(Pick::NotBothScore),
                _ => Err(unknown()),
            },
            Self::Totals => {
                let lower = raw.to_ascii_lowercase();
                let (side, line) = lower.split_once('_').ok_or_else(unknown)?;
                let line = if line.is_empty() {
                    DEFAULT_TOTALS_LINE
                } else {
                    Decimal::from_str(line).map_err(|_| MarketError::InvalidLine {
                        selection_key: selection_key.to_string(),
                    })?
                };
                match side {
                    "over" => Ok(Pick::Over(line)),
                    "under" => Ok(Pick::Under(line)),
                    _ => Err(unknown()),
                }
            }
            Self::DoubleChance => match raw.to_ascii_uppercase().as_str() {
                "1X" => Ok(Pick::HomeOrDraw),
                "12" => Ok(Pick::HomeOrAway),
                "X2" => Ok(Pick::DrawOrAway),
                _ => Err(unknown()),
            },
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A parsed selection within a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Home,
    Away,
    Draw,
    BothScore,
    NotBothScore,
    Over(Decimal),
    Under(Decimal),
    HomeOrDraw,
    HomeOrAway,
    DrawOrAway,
}

impl Pick {
    /// Whether this pick wins for the given final score.
    #[must_use]
    pub fn wins(self, score: Score) -> bool {
        let (home, away) = (score.home(), score.away());
        let total = Decimal::from(score.total());
        match self {
            Self::Home => home > away,
            Self::Away => away > home,
            Self::Draw => home == away,
            Self::BothScore => home > 0 && away > 0,
            Self::NotBothScore => home == 0 || away == 0,
            Self::Over(line) => total > line,
            Self::Under(line) => total < line,
            Self::HomeOrDraw => home >= away,
            Self::HomeOrAway => home != away,
            Self::DrawOrAway => away >= home,
        }
    }
}

/// Resolved outcome of a selection on a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    Won,
    Lost,
}

/// Why a selection could not be resolved by market rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("unsupported market '{market_key}'")]
    UnknownMarket { market_key: String },

    #[error("unsupported selection '{selection_key}' for market {market}")]
    UnknownSelection {
        market: Market,
        selection_key: String,
    },

    #[error("invalid over/under line in '{selection_key}'")]
    InvalidLine { selection_key: String },
}

/// Resolve a selection against a final score, reporting unsupported keys.
///
/// # Errors
/// Returns a [`MarketError`] if the market or selection key is unsupported.
pub fn resolve(
    market_key: &str,
    selection_key: &str,
    score: Score,
) -> Result<SelectionOutcome, MarketError> {
    let pick = Market::parse(market_key)?.pick(selection_key)?;
    Ok(if pick.wins(score) {
        SelectionOutcome::Won
    } else {
        SelectionOutcome::Lost
    })
}

/// Check that a market/selection pair is one the evaluator understands.
///
/// # Errors
/// Returns the [`MarketError`] that [`resolve`] would hit at settlement.
pub fn validate(market_key: &str, selection_key: &str) -> Result<(), MarketError> {
    Market::parse(market_key)?.pick(selection_key).map(|_| ())
}

/// Resolve a selection, failing closed: unsupported keys resolve to lost.
#[must_use]
pub fn evaluate_selection(market_key: &str, selection_key: &str, score: Score) -> SelectionOutcome {
    resolve(market_key, selection_key, score).unwrap_or_else(|e| {
        warn!(market_key, selection_key, error = %e, "Unsupported selection resolved as lost");
        SelectionOutcome::Lost
    })
}
