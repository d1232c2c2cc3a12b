//! Shared plumbing for the SQLite store: connection access, row codecs
//! and the single balance-movement primitive every money path goes through.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use super::database::connection::DbPool;
use super::database::model::{AccountRow, LedgerRow, NewLedgerRow};
use super::database::schema::{accounts, ledger_entries};
use crate::domain::id::UserId;
use crate::domain::ledger::{Account, LedgerEntry, LedgerKind};
use crate::domain::money::{from_minor, to_minor, Amount};
use crate::error::{BettingError, Error, Result};

pub(super) type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite-backed store.
///
/// Implements [`MatchStore`](crate::port::outbound::store::MatchStore),
/// [`BetStore`](crate::port::outbound::store::BetStore) and
/// [`AccountStore`](crate::port::outbound::store::AccountStore) over one
/// connection pool. Every write that moves money runs inside an
/// `IMMEDIATE` transaction.
#[derive(Clone)]
pub struct SqliteStore {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(super) fn conn(&self) -> Result<Conn> {
        self.pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))
    }
}

/// Fixed-width timestamps so that text ordering matches time ordering.
pub(super) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| Error::Parse(e.to_string()))?
        .with_timezone(&Utc))
}

pub(super) fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|e| Error::Parse(format!("{raw:?}: {e}")))
}

pub(super) fn account_from_row(row: AccountRow) -> Result<Account> {
    Ok(Account {
        id: UserId::from(row.id),
        nickname: row.nickname,
        balance: from_minor(row.balance_minor),
        created_at: parse_timestamp(&row.created_at)?,
    })
}

pub(super) fn entry_from_row(row: LedgerRow) -> Result<LedgerEntry> {
    Ok(LedgerEntry {
        user_id: UserId::from(row.user_id),
        kind: LedgerKind::from_str(&row.kind)?,
        amount: from_minor(row.amount_minor),
        reference: row.reference,
        description: row.description,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

/// Apply a signed ledger entry to its account and record it.
///
/// The balance change is one conditional `UPDATE`; a debit only matches
/// while the balance covers it. Must run inside a transaction so the
/// ledger row and the balance change land together.
pub(super) fn apply_entry(conn: &mut SqliteConnection, entry: &LedgerEntry) -> Result<Amount> {
    let delta = to_minor(entry.amount)?;
    let required = delta.saturating_neg().max(0);
    let user_id = entry.user_id.as_str();

    let updated = diesel::update(
        accounts::table
            .filter(accounts::id.eq(user_id))
            .filter(accounts::balance_minor.ge(required)),
    )
    .set(accounts::balance_minor.eq(accounts::balance_minor + delta))
    .execute(conn)?;

    if updated == 0 {
        let available: Option<i64> = accounts::table
            .find(user_id)
            .select(accounts::balance_minor)
            .first(conn)
            .optional()?;
        return Err(match available {
            None => BettingError::UserNotFound {
                user_id: user_id.to_string(),
            },
            Some(available) => BettingError::InsufficientBalance {
                available: from_minor(available),
                required: from_minor(required),
            },
        }
        .into());
    }

    diesel::insert_into(ledger_entries::table)
        .values(&NewLedgerRow {
            user_id: user_id.to_string(),
            kind: entry.kind.as_str().to_string(),
            amount_minor: delta,
            reference: entry.reference.clone(),
            description: entry.description.clone(),
            created_at: timestamp(entry.created_at),
        })
        .execute(conn)?;

    let balance: i64 = accounts::table
        .find(user_id)
        .select(accounts::balance_minor)
        .first(conn)?;
    Ok(from_minor(balance))
}
