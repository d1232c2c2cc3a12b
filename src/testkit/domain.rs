//! Builders for domain primitives used across tests.
//!
//! Provides concise factory functions for [`Match`], [`NewSelection`] and
//! [`Bet`] so tests focus on assertions rather than construction
//! boilerplate.

use rust_decimal::Decimal;

use crate::domain::{Bet, Match, MatchId, MatchStatus, NewSelection, Score, UserId};

/// Create an open match at 0-0.
pub fn open_match(home: &str, away: &str) -> Match {
    Match::new(home, away, "2026-10-19", "20:45", serde_json::Map::new())
}

/// Create a finished match with the given final score.
pub fn finished_match(home: &str, away: &str, score: Score) -> Match {
    let mut m = open_match(home, away);
    m.set_score(score);
    m.status = MatchStatus::Finished;
    m
}

/// Create a [`MatchId`] from a string.
pub fn match_id(id: &str) -> MatchId {
    MatchId::from(id)
}

/// Create a placement selection.
pub fn selection(match_id: &MatchId, market: &str, pick: &str, odd: Decimal) -> NewSelection {
    NewSelection {
        match_id: match_id.to_string(),
        market_key: market.to_string(),
        selection_key: pick.to_string(),
        odd: Some(odd),
        label: None,
    }
}

/// Create a pending bet from placement selections.
///
/// # Panics
/// Panics if the selections or stake are invalid.
pub fn bet(user: &UserId, selections: Vec<NewSelection>, stake: Decimal) -> Bet {
    Bet::try_new(user.clone(), selections, stake).expect("valid test bet")
}

/// Create a single-selection `1X2 home` bet on `match_id`.
pub fn home_win_bet(user: &UserId, match_id: &MatchId, odd: Decimal, stake: Decimal) -> Bet {
    bet(user, vec![selection(match_id, "1X2", "home", odd)], stake)
}
