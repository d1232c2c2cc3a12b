//! Bet placement and listing.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::BettingConfig;
use crate::domain::bet::{Bet, NewSelection};
use crate::domain::id::UserId;
use crate::domain::market;
use crate::domain::money::{Amount, Odd};
use crate::error::{BettingError, Result};
use crate::port::outbound::store::BetStore;

/// Outcome of a successful placement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBet {
    pub combined_odd: Odd,
    pub potential_win: Amount,
    pub bet: Bet,
    /// Balance after the stake was deducted.
    pub balance: Amount,
}

/// Bet placement service.
pub struct BettingService<B> {
    bets: Arc<B>,
    config: BettingConfig,
}

impl<B> BettingService<B>
where
    B: BetStore,
{
    /// Create a new betting service.
    pub const fn new(bets: Arc<B>, config: BettingConfig) -> Self {
        Self { bets, config }
    }

    /// Validate and place a parlay.
    ///
    /// Checks run in order: slip shape and stake, minimum stake, and market
    /// support (only with `strict_markets`). The store then checks that every
    /// referenced match exists and is open, debits the stake and stores the
    /// bet in one atomic step, which also enforces the user's balance.
    ///
    /// # Errors
    /// Returns a [`DomainError`](crate::domain::error::DomainError) for a
    /// malformed slip, a [`BettingError`] for business rejections, or a
    /// storage error. Nothing is written on any error.
    pub async fn place_bet(
        &self,
        user_id: &UserId,
        selections: Vec<NewSelection>,
        stake: Amount,
    ) -> Result<PlacedBet> {
        let bet = Bet::try_new(user_id.clone(), selections, stake)?;

        if stake < self.config.min_stake {
            return Err(BettingError::StakeBelowMinimum {
                stake,
                minimum: self.config.min_stake,
            }
            .into());
        }

        if self.config.strict_markets {
            for (index, selection) in bet.selections().iter().enumerate() {
                if let Err(source) =
                    market::validate(&selection.market_key, &selection.selection_key)
                {
                    warn!(user_id = %user_id, index, error = %source, "Placement rejected: unsupported selection");
                    return Err(BettingError::UnsupportedSelection { index, source }.into());
                }
            }
        }

        let balance = self.bets.place(&bet).await?;
        info!(
            bet_id = %bet.id(),
            user_id = %user_id,
            selections = bet.selections().len(),
            stake = %bet.stake(),
            combined_odd = %bet.combined_odd(),
            potential_win = %bet.potential_win(),
            "Bet placed"
        );

        Ok(PlacedBet {
            combined_odd: bet.combined_odd(),
            potential_win: bet.potential_win(),
            bet,
            balance,
        })
    }

    /// Bets placed by a user, newest first.
    ///
    /// # Errors
    /// Returns a storage error if the bets cannot be read.
    pub async fn bets_for_user(&self, user_id: &UserId) -> Result<Vec<Bet>> {
        self.bets.list_for_user(user_id).await
    }

    /// All bets, newest first.
    ///
    /// # Errors
    /// Returns a storage error if the bets cannot be read.
    pub async fn all_bets(&self) -> Result<Vec<Bet>> {
        self.bets.list().await
    }
}
