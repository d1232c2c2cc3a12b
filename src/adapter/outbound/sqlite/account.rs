//! SQLite account and ledger storage.

use diesel::prelude::*;

use super::database::model::{AccountRow, LedgerRow};
use super::database::schema::{accounts, ledger_entries};
use super::store::{account_from_row, apply_entry, entry_from_row, timestamp, SqliteStore};
use crate::domain::id::UserId;
use crate::domain::ledger::{Account, LedgerEntry};
use crate::domain::money::{to_minor, Amount};
use crate::error::Result;
use crate::port::outbound::store::AccountStore;

impl AccountStore for SqliteStore {
    async fn create(&self, account: &Account) -> Result<()> {
        let row = AccountRow {
            id: account.id.to_string(),
            nickname: account.nickname.clone(),
            balance_minor: to_minor(account.balance)?,
            created_at: timestamp(account.created_at),
        };
        let mut conn = self.conn()?;

        diesel::insert_into(accounts::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn get(&self, id: &UserId) -> Result<Option<Account>> {
        let mut conn = self.conn()?;

        let row: Option<AccountRow> = accounts::table
            .find(id.as_str())
            .select(AccountRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(account_from_row).transpose()
    }

    async fn apply(&self, entry: &LedgerEntry) -> Result<Amount> {
        let mut conn = self.conn()?;
        conn.immediate_transaction(|conn| apply_entry(conn, entry))
    }

    async fn entries(&self, id: &UserId) -> Result<Vec<LedgerEntry>> {
        let mut conn = self.conn()?;

        let rows: Vec<LedgerRow> = ledger_entries::table
            .filter(ledger_entries::user_id.eq(id.as_str()))
            .order(ledger_entries::id.desc())
            .select(LedgerRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(entry_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::{create_pool, run_migrations};
    use crate::domain::ledger::LedgerKind;
    use crate::error::{BettingError, Error};
    use rust_decimal_macros::dec;

    fn setup() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("accounts.db").display().to_string();
        let pool = create_pool(&url).unwrap();
        run_migrations(&pool).unwrap();
        (dir, SqliteStore::new(pool))
    }

    fn entry(user: &UserId, kind: LedgerKind, amount: Amount) -> LedgerEntry {
        LedgerEntry::try_new(user.clone(), kind, amount, None, kind.as_str()).unwrap()
    }

    #[tokio::test]
    async fn create_and_get_round_trip() {
        let (_dir, store) = setup();
        let account = Account::open("alice");
        store.create(&account).await.unwrap();

        let stored = store.get(&account.id).await.unwrap().unwrap();

        assert_eq!(stored.nickname, "alice");
        assert_eq!(stored.balance, dec!(0));
        assert!(store.get(&UserId::from("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn apply_moves_balance_and_records_history() {
        let (_dir, store) = setup();
        let account = Account::open("bob");
        store.create(&account).await.unwrap();

        store
            .apply(&entry(&account.id, LedgerKind::Deposit, dec!(100)))
            .await
            .unwrap();
        let balance = store
            .apply(&entry(&account.id, LedgerKind::Withdrawal, dec!(40.50)))
            .await
            .unwrap();

        assert_eq!(balance, dec!(59.50));
        let history = store.entries(&account.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, LedgerKind::Withdrawal);
        assert_eq!(history[0].amount, dec!(-40.50));
        assert_eq!(history[1].kind, LedgerKind::Deposit);
    }

    #[tokio::test]
    async fn overdraft_is_refused_without_side_effects() {
        let (_dir, store) = setup();
        let account = Account::open("carol");
        store.create(&account).await.unwrap();
        store
            .apply(&entry(&account.id, LedgerKind::Deposit, dec!(10)))
            .await
            .unwrap();

        let err = store
            .apply(&entry(&account.id, LedgerKind::TournamentEntry, dec!(25)))
            .await
            .unwrap_err();

        match err {
            Error::Betting(BettingError::InsufficientBalance {
                available,
                required,
            }) => {
                assert_eq!(available, dec!(10.00));
                assert_eq!(required, dec!(25.00));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.entries(&account.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn apply_to_unknown_user_fails() {
        let (_dir, store) = setup();

        let err = store
            .apply(&entry(&UserId::from("nobody"), LedgerKind::Deposit, dec!(5)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Betting(BettingError::UserNotFound { .. })));
    }
}
