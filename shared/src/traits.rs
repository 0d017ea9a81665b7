use std::error::Error as ErrorT;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Location, Match, ScraperLog, Team, Tournament};

pub type StoreError = Box<dyn ErrorT + Send + Sync>;

/// Match persistence as the reconciliation engine sees it.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_match(&self, match_id: i64) -> Result<Option<Match>, StoreError>;

    /// Insert or replace the row for `m.id`. When `credit_players` is set,
    /// both participants' aggregates are updated in the same transaction as
    /// the match write.
    async fn upsert_match(&self, m: &Match, credit_players: bool) -> Result<(), StoreError>;
}

/// Slow-changing upstream reference data (venues, teams, tournaments).
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    async fn upsert_locations(&self, locations: &[Location]) -> Result<(), StoreError>;
    async fn upsert_teams(&self, teams: &[Team]) -> Result<(), StoreError>;
    async fn upsert_tournaments(&self, tournaments: &[Tournament]) -> Result<(), StoreError>;
}

/// Append-only run history.
#[async_trait]
pub trait RunLogStore: Send + Sync {
    /// Append one row and return its id.
    async fn append_run_log(&self, log: &ScraperLog) -> Result<i64, StoreError>;

    async fn recent_runs(&self, limit: u32) -> Result<Vec<ScraperLog>, StoreError>;
}

/// Retention pass over matches and run logs.
#[async_trait]
pub trait RetentionStore: Send + Sync {
    /// Delete matches last seen before `cutoff` and run log rows older than
    /// `cutoff`. Returns `(matches_deleted, logs_deleted)`.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<(u64, u64), StoreError>;
}

/// Super-trait covering everything the collector needs from storage.
pub trait StoreFull: MatchStore + ReferenceStore + RunLogStore + RetentionStore {}

pub mod api {
    use super::*;
    use crate::errors::UpstreamError;

    /// One page of a paginated listing plus the page count the caller needs
    /// to keep iterating.
    #[derive(Debug, Clone)]
    pub struct Page<T> {
        pub items: Vec<T>,
        pub total_pages: u32,
    }

    #[async_trait]
    pub trait LocationApi: Send + Sync {
        /// Venue list, served from a short-TTL cache between refreshes.
        async fn get_locations(&self) -> Result<Vec<Location>, UpstreamError>;
    }

    #[async_trait]
    pub trait TournamentApi: Send + Sync {
        async fn get_tournaments_page(&self, page: u32)
        -> Result<Page<Tournament>, UpstreamError>;

        /// Matches of one tournament, tagged with its context. Empty is a
        /// normal result.
        async fn get_tournament_matches(
            &self,
            tournament: &Tournament,
        ) -> Result<Vec<Match>, UpstreamError>;
    }

    #[async_trait]
    pub trait TeamApi: Send + Sync {
        async fn get_teams_page(&self, page: u32) -> Result<Page<Team>, UpstreamError>;
    }

    /// The full upstream surface the collector is generic over.
    pub trait UpstreamApiFull: LocationApi + TournamentApi + TeamApi {}
}
