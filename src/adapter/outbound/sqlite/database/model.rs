//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{accounts, bet_selections, bets, ledger_entries, matches};

/// Database row for an account.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountRow {
    pub id: String,
    pub nickname: String,
    pub balance_minor: i64,
    pub created_at: String,
}

/// Database row for a match.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MatchRow {
    pub id: String,
    pub home: String,
    pub away: String,
    pub kickoff_date: String,
    pub kickoff_time: String,
    pub odds: String,
    pub home_goals: i32,
    pub away_goals: i32,
    pub result: String,
    pub status: String,
    pub is_live: bool,
    pub created_at: String,
}

/// Database row for a bet header.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = bets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BetRow {
    pub id: String,
    pub user_id: String,
    pub stake_minor: i64,
    pub combined_odd: String,
    pub potential_win_minor: i64,
    pub status: String,
    pub is_paid: bool,
    pub created_at: String,
}

/// Database row for one selection of a bet.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = bet_selections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SelectionRow {
    pub bet_id: String,
    pub position: i32,
    pub match_id: String,
    pub market_key: String,
    pub selection_key: String,
    pub odd: String,
    pub label: String,
    pub result: String,
}

/// Database row for a ledger entry (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = ledger_entries)]
pub struct NewLedgerRow {
    pub user_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub reference: Option<String>,
    pub description: String,
    pub created_at: String,
}

/// Database row for a ledger entry (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerRow {
    pub id: Option<i32>,
    pub user_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub reference: Option<String>,
    pub description: String,
    pub created_at: String,
}
