//! Seeding helpers that go through the store ports.
//!
//! Work with any [`AccountStore`] / [`MatchStore`] so the same fixtures
//! drive the memory and SQLite adapters.

use rust_decimal::Decimal;

use crate::domain::{Account, LedgerEntry, LedgerKind, Match, UserId};
use crate::port::outbound::store::{AccountStore, MatchStore};

/// Open an account and deposit `amount` into it.
///
/// # Panics
/// Panics if the store rejects the account or the deposit.
pub async fn funded_account<S: AccountStore>(store: &S, nickname: &str, amount: Decimal) -> UserId {
    let account = Account::open(nickname);
    store.create(&account).await.expect("create account");
    if amount > Decimal::ZERO {
        let deposit = LedgerEntry::try_new(
            account.id.clone(),
            LedgerKind::Deposit,
            amount,
            None,
            "test deposit",
        )
        .expect("valid deposit");
        store.apply(&deposit).await.expect("apply deposit");
    }
    account.id
}

/// Read a user's current balance.
///
/// # Panics
/// Panics if the account does not exist.
pub async fn balance_of<S: AccountStore>(store: &S, user: &UserId) -> Decimal {
    store
        .get(user)
        .await
        .expect("read account")
        .expect("account exists")
        .balance
}

/// Insert a match and return it.
///
/// # Panics
/// Panics if the store rejects the insert.
pub async fn seeded_match<S: MatchStore>(store: &S, m: Match) -> Match {
    store.insert(&m).await.expect("insert match");
    m
}
