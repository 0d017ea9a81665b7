//! Domain types shared by every battletrack component.
//!
//! The upstream API identifies everything by numeric ids except players,
//! which only ever appear as nicknames inside match payloads. Player
//! aggregates are therefore keyed by nickname (exact, case-sensitive).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub mod errors;
pub mod traits;

/// A venue ("arena") the upstream groups tournaments under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub color: Option<String>,
}

/// Upstream tournament status. Anything outside the documented ids is kept
/// verbatim in [`TournamentStatus::Unknown`] and treated as inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Upcoming,
    Active,
    Finished,
    Cancelled,
    Unknown(i64),
}

impl From<i64> for TournamentStatus {
    fn from(status_id: i64) -> Self {
        match status_id {
            1 => Self::Upcoming,
            2 => Self::Active,
            3 => Self::Finished,
            4 => Self::Cancelled,
            other => Self::Unknown(other),
        }
    }
}

impl TournamentStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn status_id(&self) -> i64 {
        match self {
            Self::Upcoming => 1,
            Self::Active => 2,
            Self::Finished => 3,
            Self::Cancelled => 4,
            Self::Unknown(id) => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub location_id: Option<i64>,
    pub status: TournamentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

/// Lifecycle of a match as far as reconciliation cares. The upstream also
/// reports cancelled fixtures; those never reach the domain layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    pub fn from_status_id(status_id: i64) -> Option<Self> {
        match status_id {
            1 => Some(Self::Scheduled),
            2 => Some(Self::Live),
            3 => Some(Self::Finished),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Finished => "finished",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "live" => Some(Self::Live),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

/// Latest known state of one fixture. `id` is assigned upstream and is the
/// reconciliation key; every other field is mutable between fetches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: i64,
    pub tournament_id: i64,
    pub tournament_name: Option<String>,
    pub home_player: String,
    pub away_player: String,
    pub home_team_id: Option<i64>,
    pub home_team: Option<String>,
    pub away_team_id: Option<i64>,
    pub away_team: Option<String>,
    pub home_score: i64,
    pub away_score: i64,
    pub status: MatchStatus,
    pub kickoff: Option<DateTime<Utc>>,
    pub stream_url: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl Match {
    /// True when any of the reconciliation-relevant fields changed since the
    /// stored snapshot: score, status, stream URL or kickoff time.
    pub fn differs_from(&self, stored: &Match) -> bool {
        self.home_score != stored.home_score
            || self.away_score != stored.away_score
            || self.status != stored.status
            || self.stream_url != stored.stream_url
            || self.kickoff != stored.kickoff
    }
}

/// Aggregate counters derived from finished matches. Never fetched from the
/// upstream, only accumulated by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Player {
    pub nickname: String,
    pub matches: i64,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
    pub goals_for: i64,
    pub goals_against: i64,
}

impl Player {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            ..Default::default()
        }
    }

    /// Fold one finished match into the counters, seen from this player's
    /// side of the scoreline.
    pub fn apply_result(&mut self, scored: i64, conceded: i64) {
        self.matches += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => self.wins += 1,
            std::cmp::Ordering::Equal => self.draws += 1,
            std::cmp::Ordering::Less => self.losses += 1,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        self.wins as f64 / self.matches as f64 * 100.0
    }
}

/// Outcome classification of one collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Everything fetched and reconciled, including the empty-window case.
    Success,
    /// Some tournaments failed, the rest was reconciled.
    Partial,
    /// The tournament listing itself or a storage write failed.
    Failure,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failure => "failure",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "partial" => Some(Self::Partial),
            "failure" => Some(Self::Failure),
            _ => None,
        }
    }
}

/// What one run did, returned to the scheduler and to manual triggers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub found: u32,
    pub new: u32,
    pub updated: u32,
    pub unchanged: u32,
    pub outcome: RunOutcome,
    pub duration: Duration,
}

/// One append-only run history row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScraperLog {
    pub id: i64,
    pub ran_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub matches_found: i64,
    pub matches_new: i64,
    pub matches_updated: i64,
    pub duration_ms: i64,
    pub error: Option<String>,
}
