//! Match administration.
//!
//! Goal updates, the live and closed flags, and deletion. Finishing a match
//! lives in [`SettlementService`](super::settlement::SettlementService)
//! because it triggers settlement.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::fixture::{Match, MatchChange, MatchStatus, Score};
use crate::domain::id::MatchId;
use crate::error::{BettingError, Error, Result};
use crate::port::outbound::store::MatchStore;

/// How a match was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Deletion {
    /// Bets reference the match; it was marked `deleted` and kept.
    Soft,
    /// Nothing referenced the match; it was removed.
    Hard,
}

/// Match administration service.
pub struct MatchService<M> {
    matches: Arc<M>,
}

impl<M> MatchService<M>
where
    M: MatchStore,
{
    /// Create a new match service.
    pub const fn new(matches: Arc<M>) -> Self {
        Self { matches }
    }

    /// Create an open match at 0-0.
    ///
    /// # Errors
    /// Returns a domain error for blank team names, or a storage error.
    pub async fn create(
        &self,
        home: &str,
        away: &str,
        date: &str,
        time: &str,
        odds: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Match> {
        let m = Match::try_new(home, away, date, time, odds)?;
        self.matches.insert(&m).await?;
        info!(match_id = %m.id, title = %m.title(), "Match created");
        Ok(m)
    }

    /// All matches, newest first.
    ///
    /// # Errors
    /// Returns a storage error if matches cannot be read.
    pub async fn list(&self) -> Result<Vec<Match>> {
        self.matches.list().await
    }

    /// Get one match.
    ///
    /// # Errors
    /// Returns [`BettingError::MatchNotFound`] or a storage error.
    pub async fn get(&self, id: &MatchId) -> Result<Match> {
        self.matches
            .get(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Set the live score. Refused once the match is finished or deleted.
    ///
    /// # Errors
    /// Returns a domain error for negative or oversized goal counts, a
    /// [`BettingError`] for refused updates, or a storage error.
    pub async fn update_goals(&self, id: &MatchId, home: i64, away: i64) -> Result<Match> {
        let score = Score::try_new(home, away)?;
        let m = self.apply(id, MatchChange::Score(score)).await?;
        debug!(match_id = %id, result = %m.result(), "Goals updated");
        Ok(m)
    }

    /// Flip the live flag. Refused once the match is finished or deleted.
    ///
    /// # Errors
    /// Returns a [`BettingError`] for refused updates, or a storage error.
    pub async fn toggle_live(&self, id: &MatchId) -> Result<Match> {
        let m = self.apply(id, MatchChange::ToggleLive).await?;
        info!(match_id = %id, is_live = m.is_live, "Live flag toggled");
        Ok(m)
    }

    /// Flip between `open` and `closed` (closed matches take no new bets).
    ///
    /// # Errors
    /// Returns a [`BettingError`] for finished or deleted matches, or a
    /// storage error.
    pub async fn toggle_closed(&self, id: &MatchId) -> Result<Match> {
        let m = self.apply(id, MatchChange::ToggleClosed).await?;
        info!(match_id = %id, status = %m.status, "Betting status toggled");
        Ok(m)
    }

    /// Delete a match: hard when no bet references it, soft otherwise.
    ///
    /// Soft-deleted matches keep their selections pending rather than
    /// settling them as lost.
    ///
    /// # Errors
    /// Returns [`BettingError::MatchNotFound`] or a storage error.
    pub async fn delete(&self, id: &MatchId) -> Result<Deletion> {
        if self.matches.remove(id).await? {
            info!(match_id = %id, "Match deleted");
            return Ok(Deletion::Hard);
        }

        self.apply(id, MatchChange::SoftDelete).await?;
        info!(match_id = %id, "Match soft-deleted");
        Ok(Deletion::Soft)
    }

    /// Apply one change atomically, explaining a refusal.
    async fn apply(&self, id: &MatchId, change: MatchChange) -> Result<Match> {
        if let Some(m) = self.matches.change(id, change).await? {
            return Ok(m);
        }
        let m = self.get(id).await?;
        ensure_in_play(&m)?;
        Err(Error::Database(format!("match {id} changed during update")))
    }
}

fn not_found(id: &MatchId) -> Error {
    BettingError::MatchNotFound {
        match_id: id.to_string(),
    }
    .into()
}

fn ensure_in_play(m: &Match) -> Result<()> {
    match m.status {
        MatchStatus::Finished => Err(BettingError::MatchAlreadyFinished {
            match_id: m.id.to_string(),
        }
        .into()),
        MatchStatus::Deleted => Err(BettingError::MatchDeleted {
            match_id: m.id.to_string(),
        }
        .into()),
        MatchStatus::Open | MatchStatus::Closed => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::domain::error::DomainError;
    use crate::port::outbound::store::BetStore;
    use crate::testkit::domain::home_win_bet;
    use crate::testkit::store::funded_account;
    use rust_decimal_macros::dec;

    fn service(store: &Arc<MemoryStore>) -> MatchService<MemoryStore> {
        MatchService::new(Arc::clone(store))
    }

    async fn created(matches: &MatchService<MemoryStore>) -> Match {
        matches
            .create("Lions", "Tigers", "2026-10-19", "18:00", Default::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_and_list_newest_first() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let first = created(&matches).await;
        let second = created(&matches).await;

        let listed = matches.list().await.unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(first.result(), "0-0");
    }

    #[tokio::test]
    async fn goals_keep_result_in_sync() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let m = created(&matches).await;

        matches.update_goals(&m.id, 2, 1).await.unwrap();

        let stored = matches.get(&m.id).await.unwrap();
        assert_eq!(stored.result(), "2-1");
    }

    #[tokio::test]
    async fn negative_goals_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let m = created(&matches).await;

        let err = matches.update_goals(&m.id, -1, 0).await.unwrap_err();

        assert!(matches!(err, Error::Domain(DomainError::NegativeGoals { value: -1 })));
    }

    #[tokio::test]
    async fn oversized_goals_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let m = created(&matches).await;

        let err = matches
            .update_goals(&m.id, i64::from(u32::MAX), 1)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Domain(DomainError::GoalsOutOfRange { value }) if value == i64::from(u32::MAX)
        ));
        assert_eq!(matches.get(&m.id).await.unwrap().result(), "0-0");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_goal_and_flag_updates_both_land() {
        let store = Arc::new(MemoryStore::new());
        let matches = Arc::new(service(&store));
        let m = created(&matches).await;

        let goals = {
            let matches = Arc::clone(&matches);
            let id = m.id.clone();
            tokio::spawn(async move { matches.update_goals(&id, 2, 0).await })
        };
        let live = {
            let matches = Arc::clone(&matches);
            let id = m.id.clone();
            tokio::spawn(async move { matches.toggle_live(&id).await })
        };
        goals.await.unwrap().unwrap();
        live.await.unwrap().unwrap();

        let stored = matches.get(&m.id).await.unwrap();
        assert_eq!(stored.result(), "2-0");
        assert!(stored.is_live);
    }

    #[tokio::test]
    async fn finished_match_is_frozen() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let m = created(&matches).await;
        store.mark_finished(&m.id).await.unwrap();

        for result in [
            matches.update_goals(&m.id, 5, 5).await,
            matches.toggle_live(&m.id).await,
            matches.toggle_closed(&m.id).await,
        ] {
            assert!(matches!(
                result,
                Err(Error::Betting(BettingError::MatchAlreadyFinished { .. }))
            ));
        }
    }

    #[tokio::test]
    async fn toggles_flip_back_and_forth() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let m = created(&matches).await;

        assert!(matches.toggle_live(&m.id).await.unwrap().is_live);
        assert!(!matches.toggle_live(&m.id).await.unwrap().is_live);
        assert_eq!(
            matches.toggle_closed(&m.id).await.unwrap().status,
            MatchStatus::Closed
        );
        assert_eq!(
            matches.toggle_closed(&m.id).await.unwrap().status,
            MatchStatus::Open
        );
    }

    #[tokio::test]
    async fn delete_is_hard_without_bets_and_soft_with_them() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let unused = created(&matches).await;
        let backed = created(&matches).await;
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        store
            .place(&home_win_bet(&user, &backed.id, dec!(2), dec!(5)))
            .await
            .unwrap();

        assert_eq!(matches.delete(&unused.id).await.unwrap(), Deletion::Hard);
        assert!(matches!(
            matches.get(&unused.id).await,
            Err(Error::Betting(BettingError::MatchNotFound { .. }))
        ));

        assert_eq!(matches.delete(&backed.id).await.unwrap(), Deletion::Soft);
        assert_eq!(
            matches.get(&backed.id).await.unwrap().status,
            MatchStatus::Deleted
        );
    }

    #[tokio::test]
    async fn finished_match_with_bets_is_soft_deleted() {
        let store = Arc::new(MemoryStore::new());
        let matches = service(&store);
        let m = created(&matches).await;
        let user = funded_account(store.as_ref(), "ann", dec!(10)).await;
        store
            .place(&home_win_bet(&user, &m.id, dec!(2), dec!(5)))
            .await
            .unwrap();
        store.mark_finished(&m.id).await.unwrap();

        assert_eq!(matches.delete(&m.id).await.unwrap(), Deletion::Soft);
        assert_eq!(matches.delete(&m.id).await.unwrap(), Deletion::Soft);
        assert_eq!(matches.get(&m.id).await.unwrap().status, MatchStatus::Deleted);
        assert!(matches!(
            matches.toggle_live(&m.id).await,
            Err(Error::Betting(BettingError::MatchDeleted { .. }))
        ));
    }

    #[tokio::test]
    async fn deleting_unknown_match_fails() {
        let store = Arc::new(MemoryStore::new());
        let err = service(&store)
            .delete(&MatchId::from("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Betting(BettingError::MatchNotFound { .. })));
    }
}
