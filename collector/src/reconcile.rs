//! Diffs freshly aggregated matches against the store, maintains player
//! aggregates on finished transitions and appends one run-log row per run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use battletrack_shared::{
    Match, MatchStatus, RunOutcome, RunResult, ScraperLog,
    traits::{
        MatchStore, ReferenceStore, RunLogStore, StoreError, StoreFull,
        api::{LocationApi, TeamApi, UpstreamApiFull},
    },
};

use crate::CollectError;
use crate::aggregate::{CollectOutput, collect_active_matches};

enum MatchDisposition {
    New,
    Updated,
    Unchanged,
}

/// The reconciliation engine. One [`run`](ReconcileEngine::run) is a full
/// collection cycle; it never panics or errors outward, every outcome ends
/// in a [`RunResult`] and a run-log row.
pub struct ReconcileEngine<A, S> {
    api: Arc<A>,
    store: S,
}

impl<A, S> ReconcileEngine<A, S>
where
    A: UpstreamApiFull,
    S: StoreFull,
{
    pub fn new(api: Arc<A>, store: S) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&self) -> RunResult {
        let started = Instant::now();
        let ran_at = Utc::now();
        info!("🔄 starting collection run");

        self.refresh_reference_data().await;

        let collected = match collect_active_matches(self.api.as_ref()).await {
            Ok(collected) => collected,
            Err(error) => {
                error!(%error, "tournament listing unreachable, failing the run");
                return self
                    .finish(
                        ran_at,
                        started,
                        RunResult {
                            found: 0,
                            new: 0,
                            updated: 0,
                            unchanged: 0,
                            outcome: RunOutcome::Failure,
                            duration: started.elapsed(),
                        },
                        Some(CollectError::Upstream(error).to_string()),
                    )
                    .await;
            }
        };

        if collected.tournaments.is_empty() && collected.matches.is_empty() {
            // Normal outside tournament hours, not an error.
            info!("no active tournaments in this window");
        } else if let Err(error) = self.store.upsert_tournaments(&collected.tournaments).await {
            warn!(%error, "failed to store tournaments, continuing with matches");
        }

        let (mut result, storage_error) = self.reconcile_all(&collected).await;
        result.duration = started.elapsed();

        let error_detail = match (&storage_error, collected.failures.as_slice()) {
            (Some(e), _) => Some(e.to_string()),
            (None, []) => None,
            (None, failures) => Some(
                failures
                    .iter()
                    .map(|f| format!("{} ({}): {}", f.tournament_name, f.tournament_id, f.error))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        };

        self.finish(ran_at, started, result, error_detail).await
    }

    /// Classify and persist every aggregated match. Returns the partial
    /// counters plus the storage error that aborted the loop, if any.
    async fn reconcile_all(&self, collected: &CollectOutput) -> (RunResult, Option<CollectError>) {
        let mut result = RunResult {
            found: collected.matches.len() as u32,
            new: 0,
            updated: 0,
            unchanged: 0,
            outcome: RunOutcome::Success,
            duration: std::time::Duration::ZERO,
        };

        for m in &collected.matches {
            match self.reconcile_match(m).await {
                Ok(MatchDisposition::New) => result.new += 1,
                Ok(MatchDisposition::Updated) => result.updated += 1,
                Ok(MatchDisposition::Unchanged) => result.unchanged += 1,
                Err(error) => {
                    error!(match_id = m.id, %error, "storage failure, aborting run");
                    result.outcome = RunOutcome::Failure;
                    return (result, Some(CollectError::Store(error)));
                }
            }
        }

        if !collected.failures.is_empty() {
            result.outcome = RunOutcome::Partial;
        }
        (result, None)
    }

    async fn reconcile_match(&self, fetched: &Match) -> Result<MatchDisposition, StoreError> {
        match self.store.find_match(fetched.id).await? {
            None => {
                // A match first observed as finished still counts: the
                // stored status was not `finished` before this run.
                let credit = fetched.status == MatchStatus::Finished;
                self.store.upsert_match(fetched, credit).await?;
                debug!(match_id = fetched.id, "new match");
                Ok(MatchDisposition::New)
            }
            Some(stored) => {
                if !fetched.differs_from(&stored) {
                    return Ok(MatchDisposition::Unchanged);
                }
                let credit = fetched.status == MatchStatus::Finished
                    && stored.status != MatchStatus::Finished;
                self.store.upsert_match(fetched, credit).await?;
                if credit {
                    debug!(
                        match_id = fetched.id,
                        home = %fetched.home_player,
                        away = %fetched.away_player,
                        "match finished, aggregates credited"
                    );
                }
                Ok(MatchDisposition::Updated)
            }
        }
    }

    /// Best-effort refresh of venues and teams; reference data never decides
    /// the run outcome.
    async fn refresh_reference_data(&self) {
        match self.api.get_locations().await {
            Ok(locations) => {
                if let Err(error) = self.store.upsert_locations(&locations).await {
                    warn!(%error, "failed to store locations");
                }
            }
            Err(error) => warn!(%error, "location refresh failed"),
        }

        let mut page = 1u32;
        loop {
            match self.api.get_teams_page(page).await {
                Ok(batch) => {
                    let page_was_empty = batch.items.is_empty();
                    if let Err(error) = self.store.upsert_teams(&batch.items).await {
                        warn!(%error, "failed to store teams");
                        break;
                    }
                    if page >= batch.total_pages || page_was_empty {
                        break;
                    }
                    page += 1;
                }
                Err(error) => {
                    warn!(page, %error, "team page fetch failed");
                    break;
                }
            }
        }
    }

    /// Append the run-log row and hand the result back. A history write
    /// failure is logged but never replaces the run result.
    async fn finish(
        &self,
        ran_at: chrono::DateTime<Utc>,
        started: Instant,
        mut result: RunResult,
        error_detail: Option<String>,
    ) -> RunResult {
        result.duration = started.elapsed();

        let log = ScraperLog {
            id: 0,
            ran_at,
            outcome: result.outcome,
            matches_found: result.found as i64,
            matches_new: result.new as i64,
            matches_updated: result.updated as i64,
            duration_ms: result.duration.as_millis() as i64,
            error: error_detail,
        };
        if let Err(error) = self.store.append_run_log(&log).await {
            error!(%error, "failed to append run log");
        }

        info!(
            outcome = result.outcome.as_str(),
            found = result.found,
            new = result.new,
            updated = result.updated,
            unchanged = result.unchanged,
            duration_ms = result.duration.as_millis() as u64,
            "🔄 collection run finished"
        );
        result
    }
}
