//! SQLite match storage.

use std::str::FromStr;

use diesel::dsl::{exists, not};
use diesel::prelude::*;

use super::database::model::MatchRow;
use super::database::schema::{bet_selections, matches};
use super::store::{parse_timestamp, timestamp, SqliteStore};
use crate::domain::error::DomainError;
use crate::domain::fixture::{Match, MatchChange, MatchStatus, Score};
use crate::domain::id::MatchId;
use crate::error::Result;
use crate::port::outbound::store::MatchStore;

fn goals(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        DomainError::GoalsOutOfRange {
            value: i64::from(value),
        }
        .into()
    })
}

fn to_row(m: &Match) -> Result<MatchRow> {
    let score = m.score();
    Ok(MatchRow {
        id: m.id.to_string(),
        home: m.home.clone(),
        away: m.away.clone(),
        kickoff_date: m.date.clone(),
        kickoff_time: m.time.clone(),
        odds: serde_json::to_string(&m.odds)?,
        home_goals: goals(score.home())?,
        away_goals: goals(score.away())?,
        result: m.result(),
        status: m.status.as_str().to_string(),
        is_live: m.is_live,
        created_at: timestamp(m.created_at),
    })
}

fn from_row(row: MatchRow) -> Result<Match> {
    let score = Score::try_new(i64::from(row.home_goals), i64::from(row.away_goals))?;
    Ok(Match::restore(
        MatchId::from(row.id),
        row.home,
        row.away,
        row.kickoff_date,
        row.kickoff_time,
        serde_json::from_str(&row.odds)?,
        score,
        MatchStatus::from_str(&row.status)?,
        row.is_live,
        parse_timestamp(&row.created_at)?,
    ))
}

impl MatchStore for SqliteStore {
    async fn insert(&self, m: &Match) -> Result<()> {
        let row = to_row(m)?;
        let mut conn = self.conn()?;

        diesel::insert_into(matches::table)
            .values(&row)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn get(&self, id: &MatchId) -> Result<Option<Match>> {
        let mut conn = self.conn()?;

        let row: Option<MatchRow> = matches::table
            .find(id.as_str())
            .select(MatchRow::as_select())
            .first(&mut conn)
            .optional()?;

        row.map(from_row).transpose()
    }

    async fn get_many(&self, ids: &[MatchId]) -> Result<Vec<Match>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;

        let rows: Vec<MatchRow> = matches::table
            .filter(matches::id.eq_any(ids.iter().map(MatchId::as_str)))
            .select(MatchRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(from_row).collect()
    }

    async fn list(&self) -> Result<Vec<Match>> {
        let mut conn = self.conn()?;

        let rows: Vec<MatchRow> = matches::table
            .order(matches::created_at.desc())
            .select(MatchRow::as_select())
            .load(&mut conn)?;

        rows.into_iter().map(from_row).collect()
    }

    async fn change(&self, id: &MatchId, change: MatchChange) -> Result<Option<Match>> {
        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            let row: Option<MatchRow> = matches::table
                .find(id.as_str())
                .select(MatchRow::as_select())
                .first(conn)
                .optional()?;
            let Some(mut m) = row.map(from_row).transpose()? else {
                return Ok(None);
            };
            if !m.apply(change) {
                return Ok(None);
            }

            let score = m.score();
            diesel::update(matches::table.find(id.as_str()))
                .set((
                    matches::home_goals.eq(goals(score.home())?),
                    matches::away_goals.eq(goals(score.away())?),
                    matches::result.eq(m.result()),
                    matches::status.eq(m.status.as_str()),
                    matches::is_live.eq(m.is_live),
                ))
                .execute(conn)?;

            Ok(Some(m))
        })
    }

    async fn mark_finished(&self, id: &MatchId) -> Result<bool> {
        let mut conn = self.conn()?;

        let updated = diesel::update(
            matches::table.filter(matches::id.eq(id.as_str())).filter(
                matches::status.eq_any([MatchStatus::Open.as_str(), MatchStatus::Closed.as_str()]),
            ),
        )
        .set((
            matches::status.eq(MatchStatus::Finished.as_str()),
            matches::is_live.eq(false),
        ))
        .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn remove(&self, id: &MatchId) -> Result<bool> {
        let mut conn = self.conn()?;

        let referenced = bet_selections::table.filter(bet_selections::match_id.eq(id.as_str()));
        let deleted = diesel::delete(
            matches::table
                .filter(matches::id.eq(id.as_str()))
                .filter(not(exists(referenced))),
        )
        .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
