#![allow(dead_code)]

pub mod temp_db;

use std::sync::Arc;

use parlay::adapter::outbound::memory::MemoryStore;
use parlay::adapter::outbound::sqlite::SqliteStore;
use parlay::application::{BettingService, MatchService, SettlementService, WalletService};
use parlay::port::outbound::store::{AccountStore, BetStore, MatchStore};
use parlay::testkit;

pub use temp_db::TempDb;

/// Every service wired over one shared store.
pub struct Engine<S> {
    pub store: Arc<S>,
    pub wallet: WalletService<S>,
    pub matches: MatchService<S>,
    pub betting: BettingService<S>,
    pub settlement: Arc<SettlementService<S, S>>,
}

impl<S> Engine<S>
where
    S: MatchStore + BetStore + AccountStore,
{
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            wallet: WalletService::new(Arc::clone(&store)),
            matches: MatchService::new(Arc::clone(&store)),
            betting: BettingService::new(Arc::clone(&store), testkit::config::betting()),
            settlement: Arc::new(SettlementService::new(
                Arc::clone(&store),
                Arc::clone(&store),
            )),
            store,
        }
    }
}

pub fn memory_engine() -> Engine<MemoryStore> {
    Engine::new(MemoryStore::new())
}

/// SQLite engine; keep the returned [`TempDb`] alive for the test's duration.
pub fn sqlite_engine(name: &str) -> (TempDb, Engine<SqliteStore>) {
    let db = TempDb::create(name);
    let engine = Engine::new(SqliteStore::new(db.pool().clone()));
    (db, engine)
}
