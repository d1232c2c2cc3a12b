//! Persistence ports for matches, bets and accounts.
//!
//! Every operation that moves money is a single atomic unit inside the
//! adapter. Callers never read a balance, adjust it in memory and write it
//! back.

use std::future::Future;

use crate::domain::bet::Bet;
use crate::domain::fixture::{Match, MatchChange};
use crate::domain::id::{BetId, MatchId, UserId};
use crate::domain::ledger::{Account, LedgerEntry};
use crate::domain::money::Amount;
use crate::domain::settlement::Evaluation;
use crate::error::Result;

/// Storage operations for matches.
pub trait MatchStore: Send + Sync {
    /// Insert a new match.
    fn insert(&self, m: &Match) -> impl Future<Output = Result<()>> + Send;

    /// Get a match by ID.
    fn get(&self, id: &MatchId) -> impl Future<Output = Result<Option<Match>>> + Send;

    /// Get every match in `ids` that exists. Missing ids are skipped.
    fn get_many(&self, ids: &[MatchId]) -> impl Future<Output = Result<Vec<Match>>> + Send;

    /// List all matches, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Match>>> + Send;

    /// Apply `change` to the stored match in one atomic step. Columns the
    /// change does not touch keep their stored values. Edits other than a
    /// soft delete only apply while the match is open or closed.
    ///
    /// Returns the match after the change, or `None` when the match is
    /// missing or the change was refused.
    fn change(
        &self,
        id: &MatchId,
        change: MatchChange,
    ) -> impl Future<Output = Result<Option<Match>>> + Send;

    /// Mark a match finished and not live, only if it is open or closed.
    ///
    /// Returns `false` when the match is missing, already finished or deleted.
    fn mark_finished(&self, id: &MatchId) -> impl Future<Output = Result<bool>> + Send;

    /// Delete a match permanently, only if no bet references it.
    ///
    /// Returns `false` when the match is missing or referenced.
    fn remove(&self, id: &MatchId) -> impl Future<Output = Result<bool>> + Send;
}

/// Result of committing an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The evaluation was written (and any payout credited).
    Applied,
    /// The stored bet was no longer pending and unpaid; nothing was written.
    Stale,
}

/// Storage operations for bets.
pub trait BetStore: Send + Sync {
    /// Debit the stake and insert the bet as one atomic unit.
    ///
    /// Every referenced match must exist and be open within that same unit,
    /// so a bet never lands on a match that finished after the caller
    /// checked it. Returns the user's balance after the debit. Fails with
    /// `BettingError::MatchNotFound`, `BettingError::MatchNotOpen`,
    /// `BettingError::UserNotFound` or `BettingError::InsufficientBalance`
    /// without writing anything.
    fn place(&self, bet: &Bet) -> impl Future<Output = Result<Amount>> + Send;

    /// Get a bet by ID.
    fn get(&self, id: &BetId) -> impl Future<Output = Result<Option<Bet>>> + Send;

    /// Pending bets with at least one selection on the given match.
    fn pending_for_match(&self, match_id: &MatchId)
        -> impl Future<Output = Result<Vec<Bet>>> + Send;

    /// Bets placed by a user, newest first.
    fn list_for_user(&self, user_id: &UserId) -> impl Future<Output = Result<Vec<Bet>>> + Send;

    /// All bets, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Bet>>> + Send;

    /// Persist an evaluation pass.
    ///
    /// Compare-and-swap on the stored bet being `pending` with
    /// `is_paid = false`. When that holds, selections, status and
    /// `is_paid` are written and `evaluation.payout` (if any) is credited
    /// with a ledger entry, all in one atomic unit. Otherwise nothing is
    /// written and [`CommitOutcome::Stale`] is returned.
    fn commit(&self, evaluation: &Evaluation)
        -> impl Future<Output = Result<CommitOutcome>> + Send;
}

/// Storage operations for accounts and the ledger.
pub trait AccountStore: Send + Sync {
    /// Create an account.
    fn create(&self, account: &Account) -> impl Future<Output = Result<()>> + Send;

    /// Get an account by ID.
    fn get(&self, id: &UserId) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// Apply a ledger entry as an atomic increment/decrement.
    ///
    /// Debits that would take the balance below zero fail with
    /// `BettingError::InsufficientBalance`. Returns the new balance.
    fn apply(&self, entry: &LedgerEntry) -> impl Future<Output = Result<Amount>> + Send;

    /// Ledger entries for a user, newest first.
    fn entries(&self, id: &UserId) -> impl Future<Output = Result<Vec<LedgerEntry>>> + Send;
}
