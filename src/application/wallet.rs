//! Account balances and ledger operations.
//!
//! Every movement is a single [`AccountStore::apply`] call, an atomic
//! increment or decrement with its ledger entry.

use std::sync::Arc;

use tracing::info;

use crate::domain::id::UserId;
use crate::domain::ledger::{Account, LedgerEntry, LedgerKind};
use crate::domain::money::Amount;
use crate::error::{BettingError, Result};
use crate::port::outbound::store::AccountStore;

/// Wallet service.
pub struct WalletService<A> {
    accounts: Arc<A>,
}

impl<A: AccountStore> WalletService<A> {
    /// Create a new wallet service.
    pub const fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    /// Open an empty account.
    ///
    /// # Errors
    /// Returns a storage error if the account cannot be created.
    pub async fn open_account(&self, nickname: &str) -> Result<Account> {
        let account = Account::open(nickname);
        self.accounts.create(&account).await?;
        info!(user_id = %account.id, nickname, "Account opened");
        Ok(account)
    }

    /// Current account state.
    ///
    /// # Errors
    /// Returns [`BettingError::UserNotFound`] or a storage error.
    pub async fn account(&self, user_id: &UserId) -> Result<Account> {
        self.accounts
            .get(user_id)
            .await?
            .ok_or_else(|| {
                BettingError::UserNotFound {
                    user_id: user_id.to_string(),
                }
                .into()
            })
    }

    /// Current balance.
    ///
    /// # Errors
    /// Returns [`BettingError::UserNotFound`] or a storage error.
    pub async fn balance(&self, user_id: &UserId) -> Result<Amount> {
        Ok(self.account(user_id).await?.balance)
    }

    /// Credit an approved deposit.
    ///
    /// # Errors
    /// Returns a domain error for a non-positive amount, a
    /// [`BettingError`] for an unknown user, or a storage error.
    pub async fn deposit(
        &self,
        user_id: &UserId,
        amount: Amount,
        reference: Option<String>,
    ) -> Result<Amount> {
        self.post(user_id, LedgerKind::Deposit, amount, reference, "Deposit approved")
            .await
    }

    /// Debit an approved withdrawal.
    ///
    /// # Errors
    /// As [`deposit`](Self::deposit), plus
    /// [`BettingError::InsufficientBalance`].
    pub async fn withdraw(
        &self,
        user_id: &UserId,
        amount: Amount,
        reference: Option<String>,
    ) -> Result<Amount> {
        self.post(user_id, LedgerKind::Withdrawal, amount, reference, "Withdrawal approved")
            .await
    }

    /// Debit a tournament registration fee.
    ///
    /// # Errors
    /// As [`withdraw`](Self::withdraw).
    pub async fn charge_tournament_entry(
        &self,
        user_id: &UserId,
        amount: Amount,
        tournament: &str,
    ) -> Result<Amount> {
        self.post(
            user_id,
            LedgerKind::TournamentEntry,
            amount,
            Some(tournament.to_string()),
            format!("Tournament entry: {tournament}"),
        )
        .await
    }

    /// Credit a tournament prize.
    ///
    /// # Errors
    /// As [`deposit`](Self::deposit).
    pub async fn award_tournament_prize(
        &self,
        user_id: &UserId,
        amount: Amount,
        tournament: &str,
    ) -> Result<Amount> {
        self.post(
            user_id,
            LedgerKind::TournamentPrize,
            amount,
            Some(tournament.to_string()),
            format!("Tournament prize: {tournament}"),
        )
        .await
    }

    /// Ledger entries for a user, newest first.
    ///
    /// # Errors
    /// Returns [`BettingError::UserNotFound`] or a storage error.
    pub async fn history(&self, user_id: &UserId) -> Result<Vec<LedgerEntry>> {
        self.account(user_id).await?;
        self.accounts.entries(user_id).await
    }

    async fn post(
        &self,
        user_id: &UserId,
        kind: LedgerKind,
        amount: Amount,
        reference: Option<String>,
        description: impl Into<String>,
    ) -> Result<Amount> {
        let entry = LedgerEntry::try_new(user_id.clone(), kind, amount, reference, description)?;
        let balance = self.accounts.apply(&entry).await?;
        info!(user_id = %user_id, kind = %kind, amount = %entry.amount, balance = %balance, "Balance updated");
        Ok(balance)
    }
}
