//! Concurrent settlement and placement against both stores.
//!
//! The payout guard lives in the store's conditional write, so these tests
//! race real tasks through the services and count ledger credits.

mod support;

use std::sync::Arc;

use parlay::application::MatchService;
use parlay::domain::{BetId, LedgerKind, MatchId, UserId};
use parlay::error::{BettingError, Error};
use parlay::port::outbound::store::{AccountStore, BetStore, MatchStore};
use parlay::testkit::domain::{home_win_bet, open_match};
use parlay::testkit::store::{balance_of, funded_account, seeded_match};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use support::{memory_engine, sqlite_engine, Engine};
use tokio::sync::Barrier;

const RACERS: usize = 6;

/// A finished match with one winning bet of 10 at 3.00 from a 10 balance.
async fn winning_bet<S>(engine: &Engine<S>) -> (UserId, MatchId, BetId)
where
    S: MatchStore + BetStore + AccountStore + 'static,
{
    let store = engine.store.as_ref();
    let user = funded_account(store, "racer", dec!(10)).await;
    let m = seeded_match(store, open_match("Home", "Away")).await;
    let bet = home_win_bet(&user, &m.id, dec!(3.00), dec!(10));
    store.place(&bet).await.unwrap();
    engine.matches.update_goals(&m.id, 2, 0).await.unwrap();
    assert!(MatchStore::mark_finished(store, &m.id).await.unwrap());
    (user, m.id, bet.id().clone())
}

async fn payout_count<S: AccountStore>(store: &S, user: &UserId) -> usize {
    store
        .entries(user)
        .await
        .unwrap()
        .iter()
        .filter(|e| e.kind == LedgerKind::Payout)
        .count()
}

async fn race_settle_bet<S>(engine: &Engine<S>)
where
    S: MatchStore + BetStore + AccountStore + 'static,
{
    let (user, _, bet_id) = winning_bet(engine).await;
    let barrier = Arc::new(Barrier::new(RACERS));

    let handles: Vec<_> = (0..RACERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let settlement = Arc::clone(&engine.settlement);
            let bet_id = bet_id.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                settlement.settle_bet(&bet_id).await
            })
        })
        .collect();

    let mut paid = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(settled) => {
                assert_eq!(settled.payout, Some(dec!(30.00)));
                paid += 1;
            }
            Err(Error::Betting(BettingError::BetNotFoundOrSettled { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(paid, 1);
    assert_eq!(payout_count(engine.store.as_ref(), &user).await, 1);
    assert_eq!(balance_of(engine.store.as_ref(), &user).await, dec!(30.00));
}

async fn race_settle_match<S>(engine: &Engine<S>)
where
    S: MatchStore + BetStore + AccountStore + 'static,
{
    let (user, match_id, _) = winning_bet(engine).await;
    let barrier = Arc::new(Barrier::new(RACERS));

    let handles: Vec<_> = (0..RACERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let settlement = Arc::clone(&engine.settlement);
            let match_id = match_id.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                settlement.settle_match(&match_id).await
            })
        })
        .collect();

    let mut won = 0;
    for handle in handles {
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.failed, 0);
        won += summary.won;
    }

    assert_eq!(won, 1);
    assert_eq!(payout_count(engine.store.as_ref(), &user).await, 1);
    assert_eq!(balance_of(engine.store.as_ref(), &user).await, dec!(30.00));
}

async fn race_finish<S>(engine: &Engine<S>)
where
    S: MatchStore + BetStore + AccountStore + 'static,
{
    let store = engine.store.as_ref();
    let user = funded_account(store, "racer", dec!(10)).await;
    let m = seeded_match(store, open_match("Home", "Away")).await;
    store
        .place(&home_win_bet(&user, &m.id, dec!(2.50), dec!(10)))
        .await
        .unwrap();
    engine.matches.update_goals(&m.id, 1, 0).await.unwrap();
    let barrier = Arc::new(Barrier::new(RACERS));

    let handles: Vec<_> = (0..RACERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let settlement = Arc::clone(&engine.settlement);
            let match_id = m.id.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                settlement.finish_match(&match_id).await
            })
        })
        .collect();

    let mut finished = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => finished += 1,
            Err(Error::Betting(BettingError::MatchAlreadyFinished { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(finished, 1);
    assert_eq!(balance_of(store, &user).await, dec!(25.00));
}

async fn race_placements<S>(engine: &Engine<S>)
where
    S: MatchStore + BetStore + AccountStore + 'static,
{
    let store = engine.store.as_ref();
    let user = funded_account(store, "racer", dec!(100)).await;
    let m = seeded_match(store, open_match("Home", "Away")).await;
    let barrier = Arc::new(Barrier::new(RACERS));

    let handles: Vec<_> = (0..RACERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let store = Arc::clone(&engine.store);
            let bet = home_win_bet(&user, &m.id, dec!(2), dec!(30));
            tokio::spawn(async move {
                barrier.wait().await;
                store.place(&bet).await
            })
        })
        .collect();

    let mut placed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(balance) => {
                assert!(balance >= Decimal::ZERO);
                placed += 1;
            }
            Err(Error::Betting(BettingError::InsufficientBalance { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(placed, 3);
    assert_eq!(balance_of(store, &user).await, dec!(10.00));
    assert_eq!(store.list_for_user(&user).await.unwrap().len(), 3);
}

async fn race_placements_against_finish<S>(engine: &Engine<S>)
where
    S: MatchStore + BetStore + AccountStore + 'static,
{
    let store = engine.store.as_ref();
    let user = funded_account(store, "racer", dec!(100)).await;
    let m = seeded_match(store, open_match("Home", "Away")).await;
    let barrier = Arc::new(Barrier::new(RACERS + 1));

    let placements: Vec<_> = (0..RACERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let store = Arc::clone(&engine.store);
            let bet = home_win_bet(&user, &m.id, dec!(2), dec!(10));
            tokio::spawn(async move {
                barrier.wait().await;
                store.place(&bet).await
            })
        })
        .collect();
    let finish = {
        let barrier = Arc::clone(&barrier);
        let settlement = Arc::clone(&engine.settlement);
        let id = m.id.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            settlement.finish_match(&id).await
        })
    };

    let summary = finish.await.unwrap().unwrap();
    let mut placed = 0;
    for handle in placements {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(Error::Betting(BettingError::MatchNotOpen { .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    // Every accepted bet was seen by the finish pass; none is left pending.
    assert_eq!(summary.evaluated, placed);
    assert!(store.pending_for_match(&m.id).await.unwrap().is_empty());
    assert_eq!(store.list_for_user(&user).await.unwrap().len(), placed);
}

async fn race_match_edits<S>(engine: &Engine<S>)
where
    S: MatchStore + BetStore + AccountStore + 'static,
{
    let m = seeded_match(engine.store.as_ref(), open_match("Home", "Away")).await;
    let matches = Arc::new(MatchService::new(Arc::clone(&engine.store)));
    let barrier = Arc::new(Barrier::new(RACERS));

    let handles: Vec<_> = (0..RACERS)
        .map(|racer| {
            let barrier = Arc::clone(&barrier);
            let matches = Arc::clone(&matches);
            let id = m.id.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                if racer == 0 {
                    matches.update_goals(&id, 3, 1).await
                } else {
                    matches.toggle_live(&id).await
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // One score write and an odd number of live toggles.
    let stored = matches.get(&m.id).await.unwrap();
    assert_eq!(stored.result(), "3-1");
    assert!(stored.is_live);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_bet_settlement_pays_once() {
    race_settle_bet(&memory_engine()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_bet_settlement_pays_once() {
    let (_db, engine) = sqlite_engine("race-bet");
    race_settle_bet(&engine).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_match_settlement_pays_once() {
    race_settle_match(&memory_engine()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_match_settlement_pays_once() {
    let (_db, engine) = sqlite_engine("race-match");
    race_settle_match(&engine).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_finish_runs_once() {
    race_finish(&memory_engine()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_finish_runs_once() {
    let (_db, engine) = sqlite_engine("race-finish");
    race_finish(&engine).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_placements_never_overdraw() {
    race_placements(&memory_engine()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_placements_never_overdraw() {
    let (_db, engine) = sqlite_engine("race-place");
    race_placements(&engine).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_placements_racing_finish_never_stay_pending() {
    race_placements_against_finish(&memory_engine()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_placements_racing_finish_never_stay_pending() {
    let (_db, engine) = sqlite_engine("race-place-finish");
    race_placements_against_finish(&engine).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_match_edits_all_land() {
    race_match_edits(&memory_engine()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_match_edits_all_land() {
    let (_db, engine) = sqlite_engine("race-edits");
    race_match_edits(&engine).await;
}
