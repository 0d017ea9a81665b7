//! Wire representations of the upstream payloads.
//!
//! The upstream names venues and teams with a `token` plus an optional
//! `token_international`; the international form wins when present. A match
//! or tournament with a `status_id` outside the documented set is dropped at
//! conversion time rather than guessed at.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use battletrack_shared::{Location, Match, MatchStatus, Team, Tournament};

#[derive(Deserialize, Debug, Clone)]
pub struct LocationDto {
    pub id: i64,
    pub token: String,
    pub token_international: Option<String>,
    pub color: Option<String>,
}

impl From<LocationDto> for Location {
    fn from(dto: LocationDto) -> Self {
        Self {
            id: dto.id,
            name: dto.token_international.unwrap_or(dto.token),
            color: dto.color,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TournamentPageDto {
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    pub tournaments: Vec<TournamentDto>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TournamentDto {
    pub id: i64,
    pub status_id: i64,
    pub token: Option<String>,
    pub token_international: Option<String>,
    pub location: Option<LocationRefDto>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LocationRefDto {
    pub id: i64,
}

impl From<TournamentDto> for Tournament {
    fn from(dto: TournamentDto) -> Self {
        let name = dto
            .token_international
            .or(dto.token)
            .unwrap_or_else(|| format!("Tournament {}", dto.id));
        Self {
            id: dto.id,
            name,
            location_id: dto.location.map(|l| l.id),
            status: dto.status_id.into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TeamPageDto {
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    pub teams: Vec<TeamDto>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TeamDto {
    pub id: i64,
    pub token: String,
    pub token_international: Option<String>,
}

impl From<TeamDto> for Team {
    fn from(dto: TeamDto) -> Self {
        Self {
            id: dto.id,
            name: dto.token_international.unwrap_or(dto.token),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct MatchDto {
    pub id: i64,
    pub status_id: i64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    pub participant1: ParticipantDto,
    pub participant2: ParticipantDto,
    #[serde(default)]
    pub score1: Option<i64>,
    #[serde(default)]
    pub score2: Option<i64>,
    #[serde(default)]
    pub stream_url: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParticipantDto {
    pub nickname: String,
    #[serde(default)]
    pub team: Option<TeamRefDto>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TeamRefDto {
    pub id: i64,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_international: Option<String>,
}

impl TeamRefDto {
    fn name(&self) -> Option<String> {
        self.token_international.clone().or_else(|| self.token.clone())
    }
}

impl MatchDto {
    /// Convert into a domain match tagged with its tournament context.
    /// Returns `None` for fixtures in a state outside the tracked lifecycle
    /// (cancelled or unknown status ids).
    pub fn into_match(self, tournament: &Tournament, fetched_at: DateTime<Utc>) -> Option<Match> {
        let status = match MatchStatus::from_status_id(self.status_id) {
            Some(status) => status,
            None => {
                warn!(
                    match_id = self.id,
                    status_id = self.status_id,
                    "skipping match with unhandled status"
                );
                return None;
            }
        };

        Some(Match {
            id: self.id,
            tournament_id: tournament.id,
            tournament_name: Some(tournament.name.clone()),
            home_player: self.participant1.nickname,
            away_player: self.participant2.nickname,
            home_team_id: self.participant1.team.as_ref().map(|t| t.id),
            home_team: self.participant1.team.as_ref().and_then(TeamRefDto::name),
            away_team_id: self.participant2.team.as_ref().map(|t| t.id),
            away_team: self.participant2.team.as_ref().and_then(TeamRefDto::name),
            home_score: self.score1.unwrap_or(0),
            away_score: self.score2.unwrap_or(0),
            status,
            kickoff: self.date,
            stream_url: self.stream_url,
            last_seen: fetched_at,
        })
    }
}
