//! In-memory store implementation.
//!
//! All tables live behind one lock so that placement, commit and ledger
//! application are atomic with respect to each other, the same guarantee
//! the SQLite adapter gets from a transaction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::bet::{Bet, BetStatus};
use crate::domain::fixture::{Match, MatchChange, MatchStatus};
use crate::domain::id::{BetId, MatchId, UserId};
use crate::domain::ledger::{Account, LedgerEntry, LedgerKind};
use crate::domain::money::Amount;
use crate::domain::settlement::Evaluation;
use crate::error::{BettingError, Error, Result};
use crate::port::outbound::store::{AccountStore, BetStore, CommitOutcome, MatchStore};

#[derive(Debug, Default)]
struct Tables {
    seq: u64,
    matches: HashMap<MatchId, (u64, Match)>,
    bets: HashMap<BetId, (u64, Bet)>,
    accounts: HashMap<UserId, Account>,
    ledger: Vec<LedgerEntry>,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Refuse a bet unless every match it references exists and is open.
    fn ensure_open(&self, bet: &Bet) -> Result<()> {
        for id in bet.match_ids() {
            match self.matches.get(&id) {
                None => {
                    return Err(BettingError::MatchNotFound {
                        match_id: id.to_string(),
                    }
                    .into())
                }
                Some((_, m)) if m.status != MatchStatus::Open => {
                    return Err(BettingError::MatchNotOpen {
                        match_id: id.to_string(),
                        status: m.status.to_string(),
                    }
                    .into())
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Apply a signed movement, refusing to go negative.
    fn move_balance(&mut self, entry: &LedgerEntry) -> Result<Amount> {
        let account = self
            .accounts
            .get_mut(&entry.user_id)
            .ok_or_else(|| BettingError::UserNotFound {
                user_id: entry.user_id.to_string(),
            })?;

        let next = account.balance + entry.amount;
        if next < Decimal::ZERO {
            return Err(BettingError::InsufficientBalance {
                available: account.balance,
                required: -entry.amount,
            }
            .into());
        }
        account.balance = next;
        self.ledger.push(entry.clone());
        Ok(next)
    }
}

/// In-memory store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing_board_reads: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` bulk match reads ([`MatchStore::get_many`])
    /// fail with a database error.
    pub fn fail_board_reads(&self, count: usize) {
        self.failing_board_reads.store(count, Ordering::SeqCst);
    }

    /// Remove a match even if bets reference it, as an out-of-band
    /// deletion would. Returns whether it existed.
    pub fn drop_match(&self, id: &MatchId) -> bool {
        self.tables.lock().matches.remove(id).is_some()
    }

    fn check_board_read(&self) -> Result<()> {
        let injected = self
            .failing_board_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match injected {
            Ok(_) => Err(Error::Database("injected match read failure".into())),
            Err(_) => Ok(()),
        }
    }
}

fn newest_first<T: Clone>(rows: impl Iterator<Item = (u64, T)>) -> Vec<T> {
    let mut rows: Vec<(u64, T)> = rows.collect();
    rows.sort_by(|a, b| b.0.cmp(&a.0));
    rows.into_iter().map(|(_, row)| row).collect()
}

impl MatchStore for MemoryStore {
    async fn insert(&self, m: &Match) -> Result<()> {
        let mut tables = self.tables.lock();
        let seq = tables.next_seq();
        tables.matches.insert(m.id.clone(), (seq, m.clone()));
        Ok(())
    }

    async fn get(&self, id: &MatchId) -> Result<Option<Match>> {
        Ok(self.tables.lock().matches.get(id).map(|(_, m)| m.clone()))
    }

    async fn get_many(&self, ids: &[MatchId]) -> Result<Vec<Match>> {
        self.check_board_read()?;
        let tables = self.tables.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.matches.get(id).map(|(_, m)| m.clone()))
            .collect())
    }

    async fn list(&self) -> Result<Vec<Match>> {
        let tables = self.tables.lock();
        Ok(newest_first(
            tables.matches.values().map(|(seq, m)| (*seq, m.clone())),
        ))
    }

    async fn change(&self, id: &MatchId, change: MatchChange) -> Result<Option<Match>> {
        let mut tables = self.tables.lock();
        Ok(tables
            .matches
            .get_mut(id)
            .and_then(|(_, stored)| stored.apply(change).then(|| stored.clone())))
    }

    async fn mark_finished(&self, id: &MatchId) -> Result<bool> {
        let mut tables = self.tables.lock();
        match tables.matches.get_mut(id) {
            Some((_, stored)) if stored.status.is_in_play() => {
                stored.status = MatchStatus::Finished;
                stored.is_live = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn remove(&self, id: &MatchId) -> Result<bool> {
        let mut tables = self.tables.lock();
        if tables.bets.values().any(|(_, b)| b.references(id)) {
            return Ok(false);
        }
        Ok(tables.matches.remove(id).is_some())
    }
}

impl BetStore for MemoryStore {
    async fn place(&self, bet: &Bet) -> Result<Amount> {
        let entry = LedgerEntry::try_new(
            bet.user_id().clone(),
            LedgerKind::Stake,
            bet.stake(),
            Some(bet.id().to_string()),
            format!("Bet placed ({} selections)", bet.selections().len()),
        )?;

        let mut tables = self.tables.lock();
        tables.ensure_open(bet)?;
        let balance = tables.move_balance(&entry)?;
        let seq = tables.next_seq();
        tables.bets.insert(bet.id().clone(), (seq, bet.clone()));
        Ok(balance)
    }

    async fn get(&self, id: &BetId) -> Result<Option<Bet>> {
        Ok(self.tables.lock().bets.get(id).map(|(_, b)| b.clone()))
    }

    async fn pending_for_match(&self, match_id: &MatchId) -> Result<Vec<Bet>> {
        let tables = self.tables.lock();
        Ok(newest_first(
            tables
                .bets
                .values()
                .filter(|(_, b)| b.status() == BetStatus::Pending && b.references(match_id))
                .map(|(seq, b)| (*seq, b.clone())),
        ))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Bet>> {
        let tables = self.tables.lock();
        Ok(newest_first(
            tables
                .bets
                .values()
                .filter(|(_, b)| b.user_id() == user_id)
                .map(|(seq, b)| (*seq, b.clone())),
        ))
    }

    async fn list(&self) -> Result<Vec<Bet>> {
        let tables = self.tables.lock();
        Ok(newest_first(
            tables.bets.values().map(|(seq, b)| (*seq, b.clone())),
        ))
    }

    async fn commit(&self, evaluation: &Evaluation) -> Result<CommitOutcome> {
        let bet = &evaluation.bet;
        let payout = evaluation
            .payout
            .map(|amount| {
                LedgerEntry::try_new(
                    bet.user_id().clone(),
                    LedgerKind::Payout,
                    amount,
                    Some(bet.id().to_string()),
                    format!("Bet won ({} selections)", bet.selections().len()),
                )
            })
            .transpose()?;

        let mut tables = self.tables.lock();
        let open = matches!(
            tables.bets.get(bet.id()),
            Some((_, stored)) if stored.status() == BetStatus::Pending && !stored.is_paid()
        );
        if !open {
            return Ok(CommitOutcome::Stale);
        }

        if let Some(entry) = &payout {
            tables.move_balance(entry)?;
        }
        if let Some((_, stored)) = tables.bets.get_mut(bet.id()) {
            *stored = bet.clone();
        }
        Ok(CommitOutcome::Applied)
    }
}

impl AccountStore for MemoryStore {
    async fn create(&self, account: &Account) -> Result<()> {
        self.tables
            .lock()
            .accounts
            .insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn get(&self, id: &UserId) -> Result<Option<Account>> {
        Ok(self.tables.lock().accounts.get(id).cloned())
    }

    async fn apply(&self, entry: &LedgerEntry) -> Result<Amount> {
        self.tables.lock().move_balance(entry)
    }

    async fn entries(&self, id: &UserId) -> Result<Vec<LedgerEntry>> {
        let tables = self.tables.lock();
        Ok(tables
            .ledger
            .iter()
            .rev()
            .filter(|e| &e.user_id == id)
            .cloned()
            .collect())
    }
}
