//! SQLite bet storage: placement, listing and the settlement commit.

use std::collections::HashMap;
use std::str::FromStr;

use diesel::prelude::*;
use diesel::SqliteConnection;

use super::database::model::{BetRow, SelectionRow};
use super::database::schema::{bet_selections, bets, matches};
use super::store::{apply_entry, parse_decimal, parse_timestamp, timestamp, SqliteStore};
use crate::domain::bet::{Bet, BetStatus, Selection, SelectionResult};
use crate::domain::fixture::MatchStatus;
use crate::domain::id::{BetId, MatchId, UserId};
use crate::domain::ledger::{LedgerEntry, LedgerKind};
use crate::domain::money::{from_minor, to_minor, Amount};
use crate::domain::settlement::Evaluation;
use crate::error::{BettingError, Error, Result};
use crate::port::outbound::store::{BetStore, CommitOutcome};

fn position(index: usize) -> Result<i32> {
    i32::try_from(index).map_err(|e| Error::Parse(e.to_string()))
}

fn to_rows(bet: &Bet) -> Result<(BetRow, Vec<SelectionRow>)> {
    let header = BetRow {
        id: bet.id().to_string(),
        user_id: bet.user_id().to_string(),
        stake_minor: to_minor(bet.stake())?,
        combined_odd: bet.combined_odd().to_string(),
        potential_win_minor: to_minor(bet.potential_win())?,
        status: bet.status().as_str().to_string(),
        is_paid: bet.is_paid(),
        created_at: timestamp(bet.created_at()),
    };
    let selections = bet
        .selections()
        .iter()
        .enumerate()
        .map(|(index, s)| {
            Ok(SelectionRow {
                bet_id: header.id.clone(),
                position: position(index)?,
                match_id: s.match_id.to_string(),
                market_key: s.market_key.clone(),
                selection_key: s.selection_key.clone(),
                odd: s.odd.to_string(),
                label: s.label.clone(),
                result: s.result.as_str().to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((header, selections))
}

fn selection_from_row(row: SelectionRow) -> Result<Selection> {
    Ok(Selection {
        match_id: MatchId::from(row.match_id),
        market_key: row.market_key,
        selection_key: row.selection_key,
        odd: parse_decimal(&row.odd)?,
        label: row.label,
        result: SelectionResult::from_str(&row.result)?,
    })
}

fn from_rows(row: BetRow, selections: Vec<SelectionRow>) -> Result<Bet> {
    let selections = selections
        .into_iter()
        .map(selection_from_row)
        .collect::<Result<Vec<_>>>()?;
    Ok(Bet::restore(
        BetId::from(row.id),
        UserId::from(row.user_id),
        selections,
        from_minor(row.stake_minor),
        parse_decimal(&row.combined_odd)?,
        from_minor(row.potential_win_minor),
        BetStatus::from_str(&row.status)?,
        row.is_paid,
        parse_timestamp(&row.created_at)?,
    ))
}

/// Load the selections for a batch of bet headers in one query.
fn hydrate(conn: &mut SqliteConnection, rows: Vec<BetRow>) -> Result<Vec<Bet>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    let selection_rows: Vec<SelectionRow> = bet_selections::table
        .filter(bet_selections::bet_id.eq_any(ids))
        .order((bet_selections::bet_id, bet_selections::position))
        .select(SelectionRow::as_select())
        .load(conn)?;

    let mut by_bet: HashMap<String, Vec<SelectionRow>> = HashMap::new();
    for row in selection_rows {
        by_bet.entry(row.bet_id.clone()).or_default().push(row);
    }

    rows.into_iter()
        .map(|row| {
            let selections = by_bet.remove(&row.id).unwrap_or_default();
            from_rows(row, selections)
        })
        .collect()
}

/// Refuse a bet unless every match it references exists and is open.
fn ensure_open(conn: &mut SqliteConnection, bet: &Bet) -> Result<()> {
    let ids = bet.match_ids();
    let found: HashMap<String, String> = matches::table
        .filter(matches::id.eq_any(ids.iter().map(MatchId::as_str)))
        .select((matches::id, matches::status))
        .load::<(String, String)>(conn)?
        .into_iter()
        .collect();

    for id in ids {
        match found.get(id.as_str()) {
            None => {
                return Err(BettingError::MatchNotFound {
                    match_id: id.to_string(),
                }
                .into())
            }
            Some(status) if status != MatchStatus::Open.as_str() => {
                return Err(BettingError::MatchNotOpen {
                    match_id: id.to_string(),
                    status: status.clone(),
                }
                .into())
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn payout_entry(bet: &Bet, amount: Amount) -> Result<LedgerEntry> {
    Ok(LedgerEntry::try_new(
        bet.user_id().clone(),
        LedgerKind::Payout,
        amount,
        Some(bet.id().to_string()),
        format!("Bet won ({} selections)", bet.selections().len()),
    )?)
}

impl BetStore for SqliteStore {
    async fn place(&self, bet: &Bet) -> Result<Amount> {
        let (header, selections) = to_rows(bet)?;
        let stake = LedgerEntry::try_new(
            bet.user_id().clone(),
            LedgerKind::Stake,
            bet.stake(),
            Some(bet.id().to_string()),
            format!("Bet placed ({} selections)", bet.selections().len()),
        )?;
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            ensure_open(conn, bet)?;
            let balance = apply_entry(conn, &stake)?;
            diesel::insert_into(bets::table)
                .values(&header)
                .execute(conn)?;
            diesel::insert_into(bet_selections::table)
                .values(&selections)
                .execute(conn)?;
            Ok(balance)
        })
    }

    async fn get(&self, id: &BetId) -> Result<Option<Bet>> {
        let mut conn = self.conn()?;

        let row: Option<BetRow> = bets::table
            .find(id.as_str())
            .select(BetRow::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(hydrate(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    async fn pending_for_match(&self, match_id: &MatchId) -> Result<Vec<Bet>> {
        let mut conn = self.conn()?;

        let referencing = bet_selections::table
            .filter(bet_selections::match_id.eq(match_id.as_str()))
            .select(bet_selections::bet_id);
        let rows: Vec<BetRow> = bets::table
            .filter(bets::status.eq(BetStatus::Pending.as_str()))
            .filter(bets::id.eq_any(referencing))
            .order(bets::created_at.desc())
            .select(BetRow::as_select())
            .load(&mut conn)?;

        hydrate(&mut conn, rows)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Bet>> {
        let mut conn = self.conn()?;

        let rows: Vec<BetRow> = bets::table
            .filter(bets::user_id.eq(user_id.as_str()))
            .order(bets::created_at.desc())
            .select(BetRow::as_select())
            .load(&mut conn)?;

        hydrate(&mut conn, rows)
    }

    async fn list(&self) -> Result<Vec<Bet>> {
        let mut conn = self.conn()?;

        let rows: Vec<BetRow> = bets::table
            .order(bets::created_at.desc())
            .select(BetRow::as_select())
            .load(&mut conn)?;

        hydrate(&mut conn, rows)
    }

    async fn commit(&self, evaluation: &Evaluation) -> Result<CommitOutcome> {
        let bet = &evaluation.bet;
        let payout = evaluation
            .payout
            .map(|amount| payout_entry(bet, amount))
            .transpose()?;
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            let claimed = diesel::update(
                bets::table
                    .filter(bets::id.eq(bet.id().as_str()))
                    .filter(bets::status.eq(BetStatus::Pending.as_str()))
                    .filter(bets::is_paid.eq(false)),
            )
            .set((
                bets::status.eq(bet.status().as_str()),
                bets::is_paid.eq(bet.is_paid()),
            ))
            .execute(conn)?;

            if claimed == 0 {
                return Ok(CommitOutcome::Stale);
            }

            for (index, selection) in bet.selections().iter().enumerate() {
                diesel::update(
                    bet_selections::table
                        .filter(bet_selections::bet_id.eq(bet.id().as_str()))
                        .filter(bet_selections::position.eq(position(index)?)),
                )
                .set(bet_selections::result.eq(selection.result.as_str()))
                .execute(conn)?;
            }

            if let Some(entry) = &payout {
                apply_entry(conn, entry)?;
            }
            Ok(CommitOutcome::Applied)
        })
    }
}
