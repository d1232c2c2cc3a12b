//! Bet state machine.
//!
//! [`evaluate`] is a pure transition from the current bet and the known
//! match results to the next bet state. Persisting the result and
//! crediting the payout is the caller's job and must be done atomically
//! (see `BetStore::commit`).
//!
//! Decision policy after every selection is refreshed:
//!
//! 1. any selection lost → bet lost (a parlay fails fast);
//! 2. otherwise any selection pending → bet stays pending;
//! 3. otherwise every selection won → bet won, paid once.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::bet::{Bet, BetStatus, SelectionResult};
use super::fixture::{Match, MatchStatus, Score};
use super::id::MatchId;
use super::market::{resolve, MarketError, SelectionOutcome};
use super::money::Amount;

/// The parts of a match the state machine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub status: MatchStatus,
    pub score: Score,
}

impl MatchSnapshot {
    #[must_use]
    pub const fn finished(score: Score) -> Self {
        Self {
            status: MatchStatus::Finished,
            score,
        }
    }

    #[must_use]
    pub const fn in_play(score: Score) -> Self {
        Self {
            status: MatchStatus::Open,
            score,
        }
    }
}

impl From<&Match> for MatchSnapshot {
    fn from(m: &Match) -> Self {
        Self {
            status: m.status,
            score: m.score(),
        }
    }
}

/// Known matches keyed by id. A selection whose match is absent is lost.
pub type MatchBoard = HashMap<MatchId, MatchSnapshot>;

/// What an evaluation pass did to the bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Bet is still waiting on at least one match.
    StillPending,
    /// Bet newly resolved to won.
    Won,
    /// Bet newly resolved to lost.
    Lost,
    /// Bet was already terminal; nothing changed.
    AlreadySettled,
}

/// A selection that hit the fail-closed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedSelection {
    pub index: usize,
    pub match_id: MatchId,
    pub error: MarketError,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The bet as it should be persisted.
    pub bet: Bet,
    /// Status before this pass.
    pub previous: BetStatus,
    pub transition: Transition,
    /// Amount to credit, present only when a bet newly wins unpaid.
    pub payout: Option<Amount>,
    /// Selections resolved as lost because their keys are unsupported.
    pub unsupported: Vec<UnsupportedSelection>,
    /// Referenced matches that do not exist.
    pub missing_matches: Vec<MatchId>,
}

impl Evaluation {
    /// Whether this pass changes anything that needs persisting.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.transition == Transition::AlreadySettled
    }
}

/// Evaluate a bet against the current match board.
#[must_use]
pub fn evaluate(bet: &Bet, board: &MatchBoard) -> Evaluation {
    let previous = bet.status();
    if previous.is_terminal() {
        return Evaluation {
            bet: bet.clone(),
            previous,
            transition: Transition::AlreadySettled,
            payout: None,
            unsupported: Vec::new(),
            missing_matches: Vec::new(),
        };
    }

    let mut next = bet.clone();
    let mut unsupported = Vec::new();
    let mut missing_matches = Vec::new();

    for (index, selection) in next.selections_mut().iter_mut().enumerate() {
        selection.result = match board.get(&selection.match_id) {
            None => {
                warn!(bet_id = %bet.id(), match_id = %selection.match_id, "Match not found, selection lost");
                if !missing_matches.contains(&selection.match_id) {
                    missing_matches.push(selection.match_id.clone());
                }
                SelectionResult::Lost
            }
            Some(snapshot) if snapshot.status != MatchStatus::Finished => SelectionResult::Pending,
            Some(snapshot) => {
                match resolve(&selection.market_key, &selection.selection_key, snapshot.score) {
                    Ok(SelectionOutcome::Won) => SelectionResult::Won,
                    Ok(SelectionOutcome::Lost) => SelectionResult::Lost,
                    Err(error) => {
                        warn!(
                            bet_id = %bet.id(),
                            market_key = %selection.market_key,
                            selection_key = %selection.selection_key,
                            error = %error,
                            "Unsupported selection resolved as lost"
                        );
                        unsupported.push(UnsupportedSelection {
                            index,
                            match_id: selection.match_id.clone(),
                            error,
                        });
                        SelectionResult::Lost
                    }
                }
            }
        };
        debug!(bet_id = %bet.id(), label = %selection.label, result = %selection.result, "Selection evaluated");
    }

    let results = next.selections().iter().map(|s| s.result);
    let status = decide(results);

    let payout = (status == BetStatus::Won && !bet.is_paid()).then(|| bet.potential_win());
    next.transition(status, payout.is_some());

    let transition = match status {
        BetStatus::Pending => Transition::StillPending,
        BetStatus::Won => Transition::Won,
        BetStatus::Lost => Transition::Lost,
    };

    Evaluation {
        bet: next,
        previous,
        transition,
        payout,
        unsupported,
        missing_matches,
    }
}

/// Aggregate selection results into a bet status.
fn decide(results: impl Iterator<Item = SelectionResult> + Clone) -> BetStatus {
    if results.clone().any(|r| r == SelectionResult::Lost) {
        BetStatus::Lost
    } else if results.clone().any(|r| r == SelectionResult::Pending) {
        BetStatus::Pending
    } else {
        BetStatus::Won
    }
}
