//! Store selection and service wiring for CLI commands.

use std::sync::Arc;

use crate::adapter::outbound::memory::MemoryStore;
use crate::adapter::outbound::sqlite::database::connection::{create_pool_with, run_migrations};
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::application::{BettingService, MatchService, SettlementService, WalletService};
use crate::config::Config;
use crate::port::outbound::store::{AccountStore, BetStore, MatchStore};

use super::command::Commands;
use super::{bet, fixture, output, user};
use crate::error::Result;

/// Every service, built over one store.
pub struct Services<S> {
    pub wallet: WalletService<S>,
    pub matches: MatchService<S>,
    pub betting: BettingService<S>,
    pub settlement: SettlementService<S, S>,
}

impl<S> Services<S>
where
    S: MatchStore + BetStore + AccountStore,
{
    /// Wire the services over a shared store.
    pub fn new(store: &Arc<S>, config: &Config) -> Self {
        Self {
            wallet: WalletService::new(Arc::clone(store)),
            matches: MatchService::new(Arc::clone(store)),
            betting: BettingService::new(Arc::clone(store), config.betting.clone()),
            settlement: SettlementService::new(Arc::clone(store), Arc::clone(store)),
        }
    }
}

/// Open the configured store and run a command against it.
///
/// SQLite databases are migrated on open, so `migrate` only reports.
///
/// # Errors
/// Returns any error from opening the store or running the command.
pub async fn execute(command: Commands, config: &Config) -> Result<()> {
    if config.database.is_memory() {
        let store = Arc::new(MemoryStore::new());
        if matches!(command, Commands::Migrate) {
            output::note("The in-memory store needs no migrations.");
            return Ok(());
        }
        return dispatch(command, &Services::new(&store, config)).await;
    }

    let pool = create_pool_with(
        &config.database.url,
        config.database.pool_size,
        config.database.busy_timeout_ms,
    )?;
    run_migrations(&pool)?;
    if matches!(command, Commands::Migrate) {
        output::success(&format!("Database ready at {}", config.database.url));
        return Ok(());
    }

    let store = Arc::new(SqliteStore::new(pool));
    dispatch(command, &Services::new(&store, config)).await
}

async fn dispatch<S>(command: Commands, services: &Services<S>) -> Result<()>
where
    S: MatchStore + BetStore + AccountStore,
{
    match command {
        Commands::Migrate => Ok(()),
        Commands::User(command) => user::execute(command, services).await,
        Commands::Match(command) => fixture::execute(command, services).await,
        Commands::Bet(command) => bet::execute(command, services).await,
    }
}
