//! Matches (fixtures) and their live score.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MatchId;

/// Largest goal count a score accepts; the store keeps goals as 32-bit integers.
pub const MAX_GOALS: i64 = i32::MAX as i64;

/// Home/away goal counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    home: u32,
    away: u32,
}

impl Score {
    /// Create a score from non-negative goal counts.
    #[must_use]
    pub const fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Create a score from signed input.
    ///
    /// # Errors
    /// Returns [`DomainError::NegativeGoals`] for a negative count and
    /// [`DomainError::GoalsOutOfRange`] for one above [`MAX_GOALS`].
    pub fn try_new(home: i64, away: i64) -> Result<Self, DomainError> {
        let goals = |value: i64| {
            if value < 0 {
                return Err(DomainError::NegativeGoals { value });
            }
            if value > MAX_GOALS {
                return Err(DomainError::GoalsOutOfRange { value });
            }
            u32::try_from(value).map_err(|_| DomainError::GoalsOutOfRange { value })
        };
        Ok(Self::new(goals(home)?, goals(away)?))
    }

    #[must_use]
    pub const fn home(&self) -> u32 {
        self.home
    }

    #[must_use]
    pub const fn away(&self) -> u32 {
        self.away
    }

    /// Total goals scored.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.home) + u64::from(self.away)
    }

    /// Result string in `"{home}-{away}"` form.
    #[must_use]
    pub fn result(&self) -> String {
        format!("{}-{}", self.home, self.away)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Accepting bets.
    #[default]
    Open,
    /// Market closed; no new bets.
    Closed,
    /// Final score recorded. Terminal.
    Finished,
    /// Soft-deleted because bets reference it.
    Deleted,
}

impl MatchStatus {
    /// Open or closed: the score and flags can still change.
    #[must_use]
    pub const fn is_in_play(self) -> bool {
        matches!(self, Self::Open | Self::Closed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Finished => "finished",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "finished" => Ok(Self::Finished),
            "deleted" => Ok(Self::Deleted),
            other => Err(DomainError::UnknownStatus {
                kind: "match",
                value: other.to_string(),
            }),
        }
    }
}

/// A single edit to a stored match.
///
/// Stores apply a change against the current row, so concurrent edits to
/// different fields never overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchChange {
    /// Set the live score.
    Score(Score),
    /// Flip the live flag.
    ToggleLive,
    /// Flip between open and closed.
    ToggleClosed,
    /// Mark deleted and not live. Applies in any status.
    SoftDelete,
}

/// A football match that selections reference.
///
/// `odds` is the admin-supplied payload keyed by market key. Bets copy the
/// odd at placement and never re-read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub home: String,
    pub away: String,
    pub date: String,
    pub time: String,
    pub odds: serde_json::Map<String, serde_json::Value>,
    score: Score,
    pub status: MatchStatus,
    pub is_live: bool,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// Create a new open match at 0-0.
    #[must_use]
    pub fn new(
        home: impl Into<String>,
        away: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        odds: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: MatchId::new(),
            home: home.into(),
            away: away.into(),
            date: date.into(),
            time: time.into(),
            odds,
            score: Score::default(),
            status: MatchStatus::Open,
            is_live: false,
            created_at: Utc::now(),
        }
    }

    /// Create a new open match, rejecting blank team names.
    ///
    /// # Errors
    /// Returns [`DomainError::MissingMatchField`] if either team is blank.
    pub fn try_new(
        home: impl Into<String>,
        away: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        odds: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, DomainError> {
        let (home, away) = (home.into(), away.into());
        if home.trim().is_empty() {
            return Err(DomainError::MissingMatchField { field: "home team" });
        }
        if away.trim().is_empty() {
            return Err(DomainError::MissingMatchField { field: "away team" });
        }
        Ok(Self::new(home, away, date, time, odds))
    }

    /// Rebuild a match from persisted parts.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn restore(
        id: MatchId,
        home: String,
        away: String,
        date: String,
        time: String,
        odds: serde_json::Map<String, serde_json::Value>,
        score: Score,
        status: MatchStatus,
        is_live: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            home,
            away,
            date,
            time,
            odds,
            score,
            status,
            is_live,
            created_at,
        }
    }

    #[must_use]
    pub const fn score(&self) -> Score {
        self.score
    }

    /// Replace the live score. The result string follows automatically.
    pub fn set_score(&mut self, score: Score) {
        self.score = score;
    }

    /// Derived `"{home}-{away}"` result string.
    #[must_use]
    pub fn result(&self) -> String {
        self.score.result()
    }

    /// Apply a change. Edits other than a soft delete only apply while the
    /// match is in play. Returns whether it applied.
    pub fn apply(&mut self, change: MatchChange) -> bool {
        if !self.status.is_in_play() && change != MatchChange::SoftDelete {
            return false;
        }
        match change {
            MatchChange::Score(score) => self.score = score,
            MatchChange::ToggleLive => self.is_live = !self.is_live,
            MatchChange::ToggleClosed => {
                self.status = match self.status {
                    MatchStatus::Closed => MatchStatus::Open,
                    _ => MatchStatus::Closed,
                };
            }
            MatchChange::SoftDelete => {
                self.status = MatchStatus::Deleted;
                self.is_live = false;
            }
        }
        true
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// `"Home vs Away"` label for logs and output.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_match_is_open_at_nil_nil() {
        let m = Match::new("Lions", "Tigers", "2026-10-19", "18:00", Default::default());
        assert_eq!(m.status, MatchStatus::Open);
        assert!(!m.is_live);
        assert_eq!(m.result(), "0-0");
    }

    #[test]
    fn result_tracks_score() {
        let mut m = Match::new("Lions", "Tigers", "", "", Default::default());
        m.set_score(Score::new(3, 1));
        assert_eq!(m.result(), "3-1");
        assert_eq!(m.score().total(), 4);
    }

    #[test]
    fn try_new_rejects_blank_teams() {
        assert_eq!(
            Match::try_new(" ", "Tigers", "", "", Default::default()),
            Err(DomainError::MissingMatchField { field: "home team" })
        );
        assert!(Match::try_new("Lions", "Tigers", "", "", Default::default()).is_ok());
    }

    #[test]
    fn score_rejects_negative_goals() {
        assert_eq!(
            Score::try_new(1, -2),
            Err(DomainError::NegativeGoals { value: -2 })
        );
        assert_eq!(Score::try_new(0, 0), Ok(Score::new(0, 0)));
    }

    #[test]
    fn score_rejects_goals_beyond_storage_range() {
        assert_eq!(
            Score::try_new(i64::from(u32::MAX), 1),
            Err(DomainError::GoalsOutOfRange {
                value: i64::from(u32::MAX)
            })
        );
        assert_eq!(
            Score::try_new(0, MAX_GOALS),
            Ok(Score::new(0, i32::MAX.unsigned_abs()))
        );
    }

    #[test]
    fn total_does_not_overflow() {
        assert_eq!(Score::new(u32::MAX, 1).total(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn changes_apply_only_while_in_play() {
        let mut m = Match::new("Lions", "Tigers", "", "", Default::default());
        assert!(m.apply(MatchChange::Score(Score::new(2, 0))));
        assert!(m.apply(MatchChange::ToggleLive));
        assert!(m.apply(MatchChange::ToggleClosed));
        assert_eq!((m.result().as_str(), m.is_live, m.status), ("2-0", true, MatchStatus::Closed));

        assert!(m.apply(MatchChange::SoftDelete));
        assert!(!m.is_live);
        assert!(!m.apply(MatchChange::Score(Score::new(3, 0))));
        assert!(!m.apply(MatchChange::ToggleClosed));
        assert_eq!(m.result(), "2-0");

        let mut finished = Match::new("Lions", "Tigers", "", "", Default::default());
        finished.status = MatchStatus::Finished;
        assert!(!finished.apply(MatchChange::ToggleLive));
        assert!(finished.apply(MatchChange::SoftDelete));
        assert_eq!(finished.status, MatchStatus::Deleted);
    }

    #[test]
    fn status_parses_from_storage_strings() {
        for status in [
            MatchStatus::Open,
            MatchStatus::Closed,
            MatchStatus::Finished,
            MatchStatus::Deleted,
        ] {
            assert_eq!(status.as_str().parse::<MatchStatus>().unwrap(), status);
        }
        assert!("live".parse::<MatchStatus>().is_err());
    }
}
