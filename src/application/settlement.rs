//! Settlement orchestration.
//!
//! Drives pending bets through the pure state machine in
//! [`domain::settlement`](crate::domain::settlement) and persists each
//! pass through [`BetStore::commit`], which is the only place a payout can
//! happen. Every trigger (match finish, match re-settle, single bet
//! re-settle) goes through [`SettlementService::settle_one`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::bet::Bet;
use crate::domain::fixture::MatchStatus;
use crate::domain::id::{BetId, MatchId};
use crate::domain::money::Amount;
use crate::domain::settlement::{evaluate, Evaluation, MatchBoard, MatchSnapshot, Transition};
use crate::error::{BettingError, Result};
use crate::port::outbound::store::{BetStore, CommitOutcome, MatchStore};

/// Aggregate result of a settlement pass over one or more bets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementSummary {
    /// Bets evaluated and committed (or found stale).
    pub evaluated: usize,
    /// Bets that newly resolved to won.
    pub won: usize,
    /// Bets that newly resolved to lost.
    pub lost: usize,
    /// Bets still waiting on another match.
    pub pending: usize,
    /// Bets another pass had already settled; nothing written.
    pub stale: usize,
    /// Bets whose pass aborted on a storage error; safe to retry.
    pub failed: usize,
    /// Selections resolved as lost because their market is unsupported.
    pub unsupported_selections: usize,
    /// Total credited to winners in this pass.
    pub paid_out: Amount,
}

impl SettlementSummary {
    fn record(&mut self, settled: &SettledBet) {
        self.evaluated += 1;
        self.unsupported_selections += settled.unsupported_selections;
        if settled.outcome == CommitOutcome::Stale {
            self.stale += 1;
            return;
        }
        match settled.transition {
            Transition::Won => self.won += 1,
            Transition::Lost => self.lost += 1,
            Transition::StillPending => self.pending += 1,
            Transition::AlreadySettled => self.stale += 1,
        }
        if let Some(payout) = settled.payout {
            self.paid_out += payout;
        }
    }
}

/// Result of one bet's settlement pass.
#[derive(Debug, Clone)]
pub struct SettledBet {
    /// The bet as evaluated in this pass.
    pub bet: Bet,
    pub transition: Transition,
    /// Amount credited, if this pass paid the bet.
    pub payout: Option<Amount>,
    pub outcome: CommitOutcome,
    pub unsupported_selections: usize,
}

/// Settlement orchestrator.
pub struct SettlementService<M, B> {
    matches: Arc<M>,
    bets: Arc<B>,
}

impl<M, B> SettlementService<M, B>
where
    M: MatchStore,
    B: BetStore,
{
    /// Create a new settlement service over the given stores.
    pub const fn new(matches: Arc<M>, bets: Arc<B>) -> Self {
        Self { matches, bets }
    }

    /// Finish a match and settle every pending bet that references it.
    ///
    /// Refused when the match is unknown, already finished or deleted, so a
    /// repeated finish never re-runs payouts.
    ///
    /// # Errors
    /// Returns a [`BettingError`] for the refusals above, or a storage
    /// error if the match itself cannot be read or written.
    pub async fn finish_match(&self, match_id: &MatchId) -> Result<SettlementSummary> {
        let m = self
            .matches
            .get(match_id)
            .await?
            .ok_or_else(|| BettingError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;

        match m.status {
            MatchStatus::Finished => {
                return Err(BettingError::MatchAlreadyFinished {
                    match_id: match_id.to_string(),
                }
                .into())
            }
            MatchStatus::Deleted => {
                return Err(BettingError::MatchDeleted {
                    match_id: match_id.to_string(),
                }
                .into())
            }
            MatchStatus::Open | MatchStatus::Closed => {}
        }

        if !self.matches.mark_finished(match_id).await? {
            // Lost the race to a concurrent finish.
            return Err(BettingError::MatchAlreadyFinished {
                match_id: match_id.to_string(),
            }
            .into());
        }
        info!(match_id = %match_id, score = %m.score(), title = %m.title(), "Match finished");

        self.settle_pending(match_id).await
    }

    /// Re-run settlement for every pending bet on a match.
    ///
    /// Safe to call any number of times; bets already settled are skipped
    /// and paid bets are never paid again.
    ///
    /// # Errors
    /// Returns [`BettingError::MatchNotFound`] for an unknown match, or a
    /// storage error if the match or its bets cannot be read.
    pub async fn settle_match(&self, match_id: &MatchId) -> Result<SettlementSummary> {
        if self.matches.get(match_id).await?.is_none() {
            return Err(BettingError::MatchNotFound {
                match_id: match_id.to_string(),
            }
            .into());
        }
        self.settle_pending(match_id).await
    }

    /// Re-run settlement for a single bet.
    ///
    /// # Errors
    /// Returns [`BettingError::BetNotFoundOrSettled`] when the bet is
    /// missing or no longer pending (including when a concurrent pass
    /// settles it first), or a storage error.
    pub async fn settle_bet(&self, bet_id: &BetId) -> Result<SettledBet> {
        let not_pending = || BettingError::BetNotFoundOrSettled {
            bet_id: bet_id.to_string(),
        };

        let bet = self.bets.get(bet_id).await?.ok_or_else(not_pending)?;
        if bet.status().is_terminal() {
            return Err(not_pending().into());
        }

        let settled = self.settle_one(&bet).await?;
        if settled.outcome == CommitOutcome::Stale {
            return Err(not_pending().into());
        }
        Ok(settled)
    }

    async fn settle_pending(&self, match_id: &MatchId) -> Result<SettlementSummary> {
        let pending = self.bets.pending_for_match(match_id).await?;
        let mut summary = SettlementSummary::default();

        for bet in &pending {
            match self.settle_one(bet).await {
                Ok(settled) => summary.record(&settled),
                Err(e) => {
                    error!(bet_id = %bet.id(), match_id = %match_id, error = %e, "Settlement pass aborted");
                    summary.failed += 1;
                }
            }
        }

        info!(
            match_id = %match_id,
            evaluated = summary.evaluated,
            won = summary.won,
            lost = summary.lost,
            pending = summary.pending,
            stale = summary.stale,
            failed = summary.failed,
            unsupported = summary.unsupported_selections,
            paid_out = %summary.paid_out,
            "Settlement complete"
        );
        if summary.unsupported_selections > 0 {
            warn!(
                match_id = %match_id,
                count = summary.unsupported_selections,
                "Selections on unsupported markets were settled as lost"
            );
        }
        Ok(summary)
    }

    /// One evaluation pass: load the bet's matches, evaluate, commit.
    ///
    /// A failed match lookup aborts before anything is written.
    async fn settle_one(&self, bet: &Bet) -> Result<SettledBet> {
        let board = self.board_for(bet).await?;
        let evaluation = evaluate(bet, &board);

        let outcome = if evaluation.is_noop() {
            CommitOutcome::Stale
        } else {
            self.bets.commit(&evaluation).await?
        };

        if outcome == CommitOutcome::Applied {
            if let Some(payout) = evaluation.payout {
                info!(bet_id = %bet.id(), user_id = %bet.user_id(), payout = %payout, "Bet paid out");
            }
        }

        Ok(settled(evaluation, outcome))
    }

    async fn board_for(&self, bet: &Bet) -> Result<MatchBoard> {
        let matches = self.matches.get_many(&bet.match_ids()).await?;
        Ok(matches
            .iter()
            .map(|m| (m.id.clone(), MatchSnapshot::from(m)))
            .collect())
    }
}

fn settled(evaluation: Evaluation, outcome: CommitOutcome) -> SettledBet {
    let applied = outcome == CommitOutcome::Applied;
    SettledBet {
        transition: evaluation.transition,
        payout: evaluation.payout.filter(|_| applied),
        outcome,
        unsupported_selections: evaluation.unsupported.len(),
        bet: evaluation.bet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::domain::bet::{BetStatus, SelectionResult};
    use crate::domain::fixture::{MatchChange, Score, MAX_GOALS};
    use crate::domain::id::UserId;
    use crate::error::Error;
    use crate::testkit::domain::{bet, home_win_bet, open_match, selection};
    use crate::testkit::store::{balance_of, funded_account, seeded_match};
    use rust_decimal_macros::dec;

    fn service(store: &Arc<MemoryStore>) -> SettlementService<MemoryStore, MemoryStore> {
        SettlementService::new(Arc::clone(store), Arc::clone(store))
    }

    async fn set_score(store: &MemoryStore, id: &MatchId, score: Score) {
        store
            .change(id, MatchChange::Score(score))
            .await
            .unwrap()
            .unwrap();
    }

    /// Place a single home-win bet, then drop its match out of band.
    async fn orphaned_bet(store: &MemoryStore, user: &UserId) -> Bet {
        let m = seeded_match(store, open_match("A", "B")).await;
        let slip = home_win_bet(user, &m.id, dec!(2), dec!(10));
        store.place(&slip).await.unwrap();
        assert!(store.drop_match(&m.id));
        slip
    }

    #[tokio::test]
    async fn finish_pays_single_winner() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(100)).await;
        let m = seeded_match(store.as_ref(), open_match("A", "B")).await;
        let slip = home_win_bet(&user, &m.id, dec!(2.5), dec!(40));
        store.place(&slip).await.unwrap();
        set_score(&store, &m.id, Score::new(2, 0)).await;

        let summary = service(&store).finish_match(&m.id).await.unwrap();

        assert_eq!(summary.won, 1);
        assert_eq!(summary.paid_out, dec!(100.00));
        assert_eq!(balance_of(store.as_ref(), &user).await, dec!(160.00));
        let stored = BetStore::get(store.as_ref(), slip.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), BetStatus::Won);
        assert!(stored.is_paid());
    }

    #[tokio::test]
    async fn refinish_is_rejected_without_payout() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        let m = seeded_match(store.as_ref(), open_match("A", "B")).await;
        store
            .place(&home_win_bet(&user, &m.id, dec!(2), dec!(10)))
            .await
            .unwrap();
        set_score(&store, &m.id, Score::new(1, 0)).await;
        let settlement = service(&store);

        settlement.finish_match(&m.id).await.unwrap();
        let err = settlement.finish_match(&m.id).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Betting(BettingError::MatchAlreadyFinished { .. })
        ));
        assert_eq!(balance_of(store.as_ref(), &user).await, dec!(20.00));
    }

    #[tokio::test]
    async fn parlay_fails_fast_on_first_losing_leg() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(100)).await;
        let m1 = seeded_match(store.as_ref(), open_match("A", "B")).await;
        let m2 = seeded_match(store.as_ref(), open_match("C", "D")).await;
        let m3 = seeded_match(store.as_ref(), open_match("E", "F")).await;
        let slip = bet(
            &user,
            vec![
                selection(&m1.id, "1X2", "home", dec!(2.0)),
                selection(&m2.id, "1X2", "home", dec!(1.5)),
                selection(&m3.id, "1X2", "home", dec!(3.0)),
            ],
            dec!(100),
        );
        store.place(&slip).await.unwrap();
        set_score(&store, &m2.id, Score::new(0, 1)).await;

        let summary = service(&store).finish_match(&m2.id).await.unwrap();

        assert_eq!(summary.lost, 1);
        let stored = BetStore::get(store.as_ref(), slip.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), BetStatus::Lost);
        let results: Vec<_> = stored.selections().iter().map(|s| s.result).collect();
        assert_eq!(
            results,
            vec![
                SelectionResult::Pending,
                SelectionResult::Lost,
                SelectionResult::Pending
            ]
        );
    }

    #[tokio::test]
    async fn parlay_waits_for_every_match_then_pays() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(100)).await;
        let m1 = seeded_match(store.as_ref(), open_match("A", "B")).await;
        let m2 = seeded_match(store.as_ref(), open_match("C", "D")).await;
        let slip = bet(
            &user,
            vec![
                selection(&m1.id, "GG", "yes", dec!(1.8)),
                selection(&m2.id, "OU", "over_2.5", dec!(2.0)),
            ],
            dec!(50),
        );
        store.place(&slip).await.unwrap();
        let settlement = service(&store);

        set_score(&store, &m1.id, Score::new(1, 1)).await;
        let first = settlement.finish_match(&m1.id).await.unwrap();
        assert_eq!(first.pending, 1);
        assert_eq!(balance_of(store.as_ref(), &user).await, dec!(50));

        set_score(&store, &m2.id, Score::new(2, 1)).await;
        let second = settlement.finish_match(&m2.id).await.unwrap();
        assert_eq!(second.won, 1);
        assert_eq!(balance_of(store.as_ref(), &user).await, dec!(230.00));

        let again = settlement.settle_match(&m2.id).await.unwrap();
        assert_eq!(again.evaluated, 0);
        assert_eq!(balance_of(store.as_ref(), &user).await, dec!(230.00));
    }

    #[tokio::test]
    async fn huge_scores_settle_totals_without_overflow() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        let m = seeded_match(store.as_ref(), open_match("A", "B")).await;
        let slip = bet(
            &user,
            vec![selection(&m.id, "OU", "over_2.5", dec!(2.0))],
            dec!(10),
        );
        store.place(&slip).await.unwrap();
        let max = u32::try_from(MAX_GOALS).unwrap();
        set_score(&store, &m.id, Score::new(max, max)).await;

        let summary = service(&store).finish_match(&m.id).await.unwrap();

        assert_eq!(summary.won, 1);
        assert_eq!(balance_of(store.as_ref(), &user).await, dec!(20.00));
    }

    #[tokio::test]
    async fn missing_match_loses_the_bet() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        let slip = orphaned_bet(&store, &user).await;

        let settled = service(&store).settle_bet(slip.id()).await.unwrap();

        assert_eq!(settled.transition, Transition::Lost);
        assert_eq!(settled.bet.selections()[0].result, SelectionResult::Lost);
    }

    #[tokio::test]
    async fn settle_bet_rejects_settled_and_unknown_bets() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        let slip = orphaned_bet(&store, &user).await;
        let settlement = service(&store);
        settlement.settle_bet(slip.id()).await.unwrap();

        for id in [slip.id().clone(), BetId::from("nope")] {
            let err = settlement.settle_bet(&id).await.unwrap_err();
            assert!(matches!(
                err,
                Error::Betting(BettingError::BetNotFoundOrSettled { .. })
            ));
        }
    }

    #[tokio::test]
    async fn unsupported_market_is_counted_and_lost() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        let m = seeded_match(store.as_ref(), open_match("A", "B")).await;
        store
            .place(&bet(
                &user,
                vec![selection(&m.id, "HT/FT", "1/1", dec!(4.0))],
                dec!(10),
            ))
            .await
            .unwrap();

        let summary = service(&store).finish_match(&m.id).await.unwrap();

        assert_eq!(summary.lost, 1);
        assert_eq!(summary.unsupported_selections, 1);
    }

    #[tokio::test]
    async fn storage_failure_aborts_the_bet_and_retry_settles_it() {
        let store = Arc::new(MemoryStore::new());
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        let m = seeded_match(store.as_ref(), open_match("A", "B")).await;
        let slip = home_win_bet(&user, &m.id, dec!(3), dec!(10));
        store.place(&slip).await.unwrap();
        set_score(&store, &m.id, Score::new(1, 0)).await;
        let settlement = service(&store);
        assert!(store.mark_finished(&m.id).await.unwrap());

        store.fail_board_reads(1);
        let summary = settlement.settle_match(&m.id).await.unwrap();
        assert_eq!(summary.failed, 1);
        let stored = BetStore::get(store.as_ref(), slip.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), BetStatus::Pending);
        assert!(!stored.is_paid());

        let summary = settlement.settle_match(&m.id).await.unwrap();
        assert_eq!(summary.won, 1);
        assert_eq!(balance_of(store.as_ref(), &user).await, dec!(30.00));
    }

    #[tokio::test]
    async fn finishing_deleted_or_unknown_match_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let m = seeded_match(store.as_ref(), open_match("A", "B")).await;
        store.change(&m.id, MatchChange::SoftDelete).await.unwrap().unwrap();
        let settlement = service(&store);

        assert!(matches!(
            settlement.finish_match(&m.id).await,
            Err(Error::Betting(BettingError::MatchDeleted { .. }))
        ));
        assert!(matches!(
            settlement.finish_match(&MatchId::from("nope")).await,
            Err(Error::Betting(BettingError::MatchNotFound { .. }))
        ));
    }
}
