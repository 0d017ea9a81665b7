//! Walks every active tournament and merges their match lists into one
//! deduplicated set, isolating per-tournament fetch failures.

use std::collections::HashMap;

use tracing::{debug, warn};

use battletrack_shared::{
    Match, Tournament, TournamentStatus,
    errors::UpstreamError,
    traits::api::TournamentApi,
};

/// Everything one aggregation pass produced. `failures` lists tournaments
/// whose match fetch failed; the rest of the output is unaffected by them.
#[derive(Debug)]
pub struct CollectOutput {
    pub matches: Vec<Match>,
    pub tournaments: Vec<Tournament>,
    pub failures: Vec<TournamentFailure>,
}

#[derive(Debug)]
pub struct TournamentFailure {
    pub tournament_id: i64,
    pub tournament_name: String,
    pub error: UpstreamError,
}

/// Fetch all tournament pages, filter to the active ones and collect their
/// matches. Only a failure of the tournament listing itself propagates;
/// anything per-tournament is recorded and skipped.
pub async fn collect_active_matches<A>(api: &A) -> Result<CollectOutput, UpstreamError>
where
    A: TournamentApi + ?Sized,
{
    let mut discovered = Vec::new();
    let mut page = 1u32;
    loop {
        let batch = api.get_tournaments_page(page).await?;
        let page_was_empty = batch.items.is_empty();
        discovered.extend(batch.items);
        if page >= batch.total_pages || page_was_empty {
            break;
        }
        page += 1;
    }

    let active: Vec<Tournament> = discovered
        .into_iter()
        .filter(|t| {
            if let TournamentStatus::Unknown(status_id) = t.status {
                warn!(
                    tournament_id = t.id,
                    status_id, "unknown tournament status, treating as inactive"
                );
            }
            t.status.is_active()
        })
        .collect();
    debug!(active = active.len(), "tournament discovery finished");

    let mut failures = Vec::new();
    let mut order: Vec<i64> = Vec::new();
    let mut by_id: HashMap<i64, Match> = HashMap::new();

    for tournament in &active {
        match api.get_tournament_matches(tournament).await {
            Ok(matches) => {
                debug!(
                    tournament_id = tournament.id,
                    count = matches.len(),
                    "collected tournament matches"
                );
                for m in matches {
                    // The same id should never appear under two tournaments;
                    // when it does, the later fetch wins.
                    let id = m.id;
                    if by_id.insert(id, m).is_none() {
                        order.push(id);
                    }
                }
            }
            Err(error) => {
                warn!(
                    tournament_id = tournament.id,
                    tournament = %tournament.name,
                    %error,
                    "match fetch failed, skipping tournament"
                );
                failures.push(TournamentFailure {
                    tournament_id: tournament.id,
                    tournament_name: tournament.name.clone(),
                    error,
                });
            }
        }
    }

    let matches = order.into_iter().filter_map(|id| by_id.remove(&id)).collect();
    Ok(CollectOutput {
        matches,
        tournaments: active,
        failures,
    })
}
