//! SQLite storage layer used by the collector and read by the dashboard.
//!
//! This crate defines the [`SharedDatabase`] type: a thread-safe wrapper
//! around a single SQLite connection implementing the shared store traits.
//! Match and run-log rows are the only tables the collector mutates; player
//! aggregates are maintained in the same transaction as the match write that
//! triggers them.

use std::{env, error::Error, path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use migrations::DbMigration;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params, types::Type};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use battletrack_shared::{
    Location, Match, MatchStatus, Player, RunOutcome, ScraperLog, Team, Tournament,
    traits::{
        MatchStore, ReferenceStore, RetentionStore, RunLogStore, StoreError, StoreFull,
    },
};

mod migrations;

/// Thread-safe wrapper around a SQLite database connection shared across
/// async tasks.
#[derive(Debug, Clone)]
pub struct SharedDatabase {
    conn: Arc<Mutex<Connection>>,
    init_once: Arc<OnceCell<()>>,
}

fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn ts_from_sql(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn conversion_failure(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        Box::<dyn Error + Send + Sync>::from(message),
    )
}

const MATCH_COLUMNS: &str = "id, tournament_id, tournament_name, home_player, away_player, \
     home_team_id, home_team, away_team_id, away_team, home_score, away_score, \
     status, kickoff, stream_url, last_seen";

fn map_match_row(row: &Row<'_>) -> rusqlite::Result<Match> {
    let status_raw: String = row.get(11)?;
    let status = MatchStatus::parse(&status_raw)
        .ok_or_else(|| conversion_failure(11, format!("unknown match status: {status_raw}")))?;
    let kickoff = row
        .get::<_, Option<String>>(12)?
        .map(|raw| ts_from_sql(12, raw))
        .transpose()?;
    let last_seen = ts_from_sql(14, row.get(14)?)?;

    Ok(Match {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        tournament_name: row.get(2)?,
        home_player: row.get(3)?,
        away_player: row.get(4)?,
        home_team_id: row.get(5)?,
        home_team: row.get(6)?,
        away_team_id: row.get(7)?,
        away_team: row.get(8)?,
        home_score: row.get(9)?,
        away_score: row.get(10)?,
        status,
        kickoff,
        stream_url: row.get(13)?,
        last_seen,
    })
}

fn map_run_log_row(row: &Row<'_>) -> rusqlite::Result<ScraperLog> {
    let outcome_raw: String = row.get(2)?;
    let outcome = RunOutcome::parse(&outcome_raw)
        .ok_or_else(|| conversion_failure(2, format!("unknown run outcome: {outcome_raw}")))?;

    Ok(ScraperLog {
        id: row.get(0)?,
        ran_at: ts_from_sql(1, row.get(1)?)?,
        outcome,
        matches_found: row.get(3)?,
        matches_new: row.get(4)?,
        matches_updated: row.get(5)?,
        duration_ms: row.get(6)?,
        error: row.get(7)?,
    })
}

/// Fold one finished match into a player's aggregate row, creating the row
/// on first sight.
fn credit_player(
    tx: &Transaction<'_>,
    nickname: &str,
    scored: i64,
    conceded: i64,
) -> rusqlite::Result<()> {
    let mut template = Player::default();
    template.apply_result(scored, conceded);

    tx.execute(
        "INSERT INTO players (nickname, matches, wins, draws, losses, goals_for, goals_against)
         VALUES (?1, 1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(nickname) DO UPDATE SET
             matches = matches + 1,
             wins = wins + excluded.wins,
             draws = draws + excluded.draws,
             losses = losses + excluded.losses,
             goals_for = goals_for + excluded.goals_for,
             goals_against = goals_against + excluded.goals_against",
        params![
            nickname,
            template.wins,
            template.draws,
            template.losses,
            scored,
            conceded
        ],
    )?;
    Ok(())
}

#[async_trait]
impl MatchStore for SharedDatabase {
    async fn find_match(&self, match_id: i64) -> Result<Option<Match>, StoreError> {
        let db = self.conn.lock().await;

        db.query_row(
            &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?1"),
            [match_id],
            map_match_row,
        )
        .optional()
        .map_err(|e| Box::new(e) as StoreError)
    }

    async fn upsert_match(&self, m: &Match, credit_players: bool) -> Result<(), StoreError> {
        let mut db = self.conn.lock().await;

        let tx = db.transaction()?;
        tx.execute(
            "INSERT INTO matches (id, tournament_id, tournament_name, home_player, away_player,
                 home_team_id, home_team, away_team_id, away_team, home_score, away_score,
                 status, kickoff, stream_url, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                 tournament_id = excluded.tournament_id,
                 tournament_name = excluded.tournament_name,
                 home_player = excluded.home_player,
                 away_player = excluded.away_player,
                 home_team_id = excluded.home_team_id,
                 home_team = excluded.home_team,
                 away_team_id = excluded.away_team_id,
                 away_team = excluded.away_team,
                 home_score = excluded.home_score,
                 away_score = excluded.away_score,
                 status = excluded.status,
                 kickoff = excluded.kickoff,
                 stream_url = excluded.stream_url,
                 last_seen = excluded.last_seen",
            params![
                m.id,
                m.tournament_id,
                m.tournament_name,
                m.home_player,
                m.away_player,
                m.home_team_id,
                m.home_team,
                m.away_team_id,
                m.away_team,
                m.home_score,
                m.away_score,
                m.status.as_str(),
                m.kickoff.as_ref().map(ts_to_sql),
                m.stream_url,
                ts_to_sql(&m.last_seen),
            ],
        )?;

        if credit_players {
            credit_player(&tx, &m.home_player, m.home_score, m.away_score)?;
            credit_player(&tx, &m.away_player, m.away_score, m.home_score)?;
        }

        tx.commit().map_err(|e| e.into())
    }
}

#[async_trait]
impl ReferenceStore for SharedDatabase {
    async fn upsert_locations(&self, locations: &[Location]) -> Result<(), StoreError> {
        let mut db = self.conn.lock().await;

        let tx = db.transaction()?;
        for location in locations {
            tx.execute(
                "INSERT INTO locations (id, name, color) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, color = excluded.color",
                params![location.id, location.name, location.color],
            )?;
        }
        tx.commit().map_err(|e| e.into())
    }

    async fn upsert_teams(&self, teams: &[Team]) -> Result<(), StoreError> {
        let mut db = self.conn.lock().await;

        let tx = db.transaction()?;
        for team in teams {
            tx.execute(
                "INSERT INTO teams (id, name) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                params![team.id, team.name],
            )?;
        }
        tx.commit().map_err(|e| e.into())
    }

    async fn upsert_tournaments(&self, tournaments: &[Tournament]) -> Result<(), StoreError> {
        let mut db = self.conn.lock().await;

        let tx = db.transaction()?;
        for tournament in tournaments {
            tx.execute(
                "INSERT INTO tournaments (id, name, location_id, status_id)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     location_id = excluded.location_id,
                     status_id = excluded.status_id",
                params![
                    tournament.id,
                    tournament.name,
                    tournament.location_id,
                    tournament.status.status_id()
                ],
            )?;
        }
        tx.commit().map_err(|e| e.into())
    }
}

#[async_trait]
impl RunLogStore for SharedDatabase {
    async fn append_run_log(&self, log: &ScraperLog) -> Result<i64, StoreError> {
        let db = self.conn.lock().await;

        db.execute(
            "INSERT INTO scraper_logs
                 (ran_at, outcome, matches_found, matches_new, matches_updated, duration_ms, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                ts_to_sql(&log.ran_at),
                log.outcome.as_str(),
                log.matches_found,
                log.matches_new,
                log.matches_updated,
                log.duration_ms,
                log.error,
            ],
        )?;
        Ok(db.last_insert_rowid())
    }

    async fn recent_runs(&self, limit: u32) -> Result<Vec<ScraperLog>, StoreError> {
        let db = self.conn.lock().await;

        let mut stmt = db.prepare(
            "SELECT id, ran_at, outcome, matches_found, matches_new, matches_updated,
                    duration_ms, error
             FROM scraper_logs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit], map_run_log_row)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| Box::new(e) as StoreError)
    }
}

#[async_trait]
impl RetentionStore for SharedDatabase {
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<(u64, u64), StoreError> {
        let mut db = self.conn.lock().await;
        let cutoff_sql = ts_to_sql(&cutoff);

        let tx = db.transaction()?;
        let matches_deleted =
            tx.execute("DELETE FROM matches WHERE last_seen < ?1", [&cutoff_sql])?;
        let logs_deleted =
            tx.execute("DELETE FROM scraper_logs WHERE ran_at < ?1", [&cutoff_sql])?;
        tx.commit()?;

        Ok((matches_deleted as u64, logs_deleted as u64))
    }
}

impl StoreFull for SharedDatabase {}

impl SharedDatabase {
    /// Create a new database at the given path.
    pub fn new(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        Ok(SharedDatabase::from_connection(conn))
    }

    /// Create a new database from the given connection.
    pub fn from_connection(conn: Connection) -> Self {
        info!("📜 opening SQLite connection");
        Self {
            conn: Arc::new(Mutex::new(conn)),
            init_once: Arc::new(OnceCell::new()),
        }
    }

    /// Create a new database using the `DB_PATH` environment variable.
    pub fn new_from_env() -> rusqlite::Result<Self> {
        let db_dir = env::var("DB_PATH").unwrap_or_else(|_| "./".to_string());

        let mut db_path = std::path::PathBuf::from(db_dir);
        db_path.push("battletrack.db3");
        Self::new(db_path)
    }

    /// Initialize the schemas of the database.
    pub async fn init(&self) {
        let _ = self
            .init_once
            .get_or_init(|| async {
                info!("📜 initializing schema");

                let db = self.conn.lock().await;

                db.execute(
                    "CREATE TABLE IF NOT EXISTS locations (
                        id INTEGER PRIMARY KEY,
                        name TEXT NOT NULL,
                        color TEXT
                    )",
                    [],
                )
                .unwrap();

                db.execute(
                    "CREATE TABLE IF NOT EXISTS teams (
                        id INTEGER PRIMARY KEY,
                        name TEXT NOT NULL
                    )",
                    [],
                )
                .unwrap();

                db.execute(
                    "CREATE TABLE IF NOT EXISTS tournaments (
                        id INTEGER PRIMARY KEY,
                        name TEXT NOT NULL,
                        location_id INTEGER,
                        status_id INTEGER NOT NULL
                    )",
                    [],
                )
                .unwrap();

                db.execute(
                    "CREATE TABLE IF NOT EXISTS matches (
                        id INTEGER PRIMARY KEY,
                        tournament_id INTEGER NOT NULL,
                        tournament_name TEXT,
                        home_player TEXT NOT NULL,
                        away_player TEXT NOT NULL,
                        home_team_id INTEGER,
                        home_team TEXT,
                        away_team_id INTEGER,
                        away_team TEXT,
                        home_score INTEGER NOT NULL DEFAULT 0,
                        away_score INTEGER NOT NULL DEFAULT 0,
                        status TEXT NOT NULL,
                        kickoff TEXT,
                        last_seen TEXT NOT NULL
                    )",
                    [],
                )
                .unwrap();

                db.execute(
                    "CREATE TABLE IF NOT EXISTS players (
                        nickname TEXT PRIMARY KEY,
                        matches INTEGER NOT NULL DEFAULT 0,
                        wins INTEGER NOT NULL DEFAULT 0,
                        draws INTEGER NOT NULL DEFAULT 0,
                        losses INTEGER NOT NULL DEFAULT 0,
                        goals_for INTEGER NOT NULL DEFAULT 0,
                        goals_against INTEGER NOT NULL DEFAULT 0
                    )",
                    [],
                )
                .unwrap();

                db.execute(
                    "CREATE TABLE IF NOT EXISTS scraper_logs (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        ran_at TEXT NOT NULL,
                        outcome TEXT NOT NULL,
                        matches_found INTEGER NOT NULL,
                        matches_new INTEGER NOT NULL,
                        matches_updated INTEGER NOT NULL,
                        duration_ms INTEGER NOT NULL,
                        error TEXT
                    )",
                    [],
                )
                .unwrap();

                debug!("running migrations");
                migrations::V2::do_migration(&db);
                migrations::V3::do_migration(&db);

                info!("📜 database ready");
            })
            .await;
    }

    // === Read accessors for the dashboard boundary ===

    /// Matches, newest kickoff first, optionally narrowed by status and
    /// venue.
    pub async fn matches_filtered(
        &self,
        status: Option<MatchStatus>,
        location_id: Option<i64>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Match>, StoreError> {
        let db = self.conn.lock().await;

        let mut stmt = db.prepare(&format!(
            "SELECT {cols} FROM matches m
             LEFT JOIN tournaments t ON m.tournament_id = t.id
             WHERE (?1 IS NULL OR m.status = ?1)
               AND (?2 IS NULL OR t.location_id = ?2)
             ORDER BY m.kickoff DESC, m.id DESC
             LIMIT ?3 OFFSET ?4",
            cols = MATCH_COLUMNS
                .split(", ")
                .map(|c| format!("m.{c}"))
                .collect::<Vec<_>>()
                .join(", "),
        ))?;
        let rows = stmt.query_map(
            params![status.map(|s| s.as_str()), location_id, limit, offset],
            map_match_row,
        )?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| Box::new(e) as StoreError)
    }

    /// Player ranking sorted by wins, then matches played. `min_matches`
    /// keeps one-off nicknames out of the board.
    pub async fn player_rankings(&self, min_matches: i64) -> Result<Vec<Player>, StoreError> {
        let db = self.conn.lock().await;

        let mut stmt = db.prepare(
            "SELECT nickname, matches, wins, draws, losses, goals_for, goals_against
             FROM players WHERE matches >= ?1
             ORDER BY wins DESC, matches DESC, nickname ASC",
        )?;
        let rows = stmt.query_map([min_matches], |row| {
            Ok(Player {
                nickname: row.get(0)?,
                matches: row.get(1)?,
                wins: row.get(2)?,
                draws: row.get(3)?,
                losses: row.get(4)?,
                goals_for: row.get(5)?,
                goals_against: row.get(6)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| Box::new(e) as StoreError)
    }

    pub async fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let db = self.conn.lock().await;

        let mut stmt = db.prepare("SELECT id, name, color FROM locations ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Location {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| Box::new(e) as StoreError)
    }

    pub async fn tournaments(&self) -> Result<Vec<Tournament>, StoreError> {
        let db = self.conn.lock().await;

        let mut stmt =
            db.prepare("SELECT id, name, location_id, status_id FROM tournaments ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Tournament {
                id: row.get(0)?,
                name: row.get(1)?,
                location_id: row.get(2)?,
                status: row.get::<_, i64>(3)?.into(),
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| Box::new(e) as StoreError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battletrack_shared::TournamentStatus;
    use chrono::TimeDelta;

    async fn mem_db() -> SharedDatabase {
        let db = SharedDatabase::from_connection(Connection::open_in_memory().unwrap());
        db.init().await;
        db
    }

    fn fixture_match(id: i64, status: MatchStatus, score: (i64, i64)) -> Match {
        Match {
            id,
            tournament_id: 42,
            tournament_name: Some("Evening Cup".into()),
            home_player: "aguuero".into(),
            away_player: "Linox".into(),
            home_team_id: Some(7),
            home_team: Some("Manchester City".into()),
            away_team_id: Some(8),
            away_team: Some("Liverpool".into()),
            home_score: score.0,
            away_score: score.1,
            status,
            kickoff: Some(Utc::now()),
            stream_url: None,
            last_seen: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_and_find_round_trip() {
        let db = mem_db().await;
        let m = fixture_match(1906579, MatchStatus::Live, (3, 3));

        db.upsert_match(&m, false).await.unwrap();
        let found = db.find_match(1906579).await.unwrap().unwrap();
        assert_eq!(found, m);

        let mut corrected = m.clone();
        corrected.home_score = 4;
        corrected.status = MatchStatus::Finished;
        db.upsert_match(&corrected, false).await.unwrap();

        let found = db.find_match(1906579).await.unwrap().unwrap();
        assert_eq!(found.home_score, 4);
        assert_eq!(found.status, MatchStatus::Finished);

        assert!(db.find_match(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn crediting_updates_both_players_once_per_call() {
        let db = mem_db().await;
        let m = fixture_match(1, MatchStatus::Finished, (4, 3));

        db.upsert_match(&m, true).await.unwrap();
        // Refetch without credit must leave the aggregates alone.
        db.upsert_match(&m, false).await.unwrap();

        let rankings = db.player_rankings(0).await.unwrap();
        assert_eq!(rankings.len(), 2);

        let winner = rankings.iter().find(|p| p.nickname == "aguuero").unwrap();
        assert_eq!((winner.matches, winner.wins, winner.losses), (1, 1, 0));
        assert_eq!((winner.goals_for, winner.goals_against), (4, 3));

        let loser = rankings.iter().find(|p| p.nickname == "Linox").unwrap();
        assert_eq!((loser.matches, loser.wins, loser.losses), (1, 0, 1));
        assert_eq!((loser.goals_for, loser.goals_against), (3, 4));
    }

    #[tokio::test]
    async fn rankings_sort_by_wins_and_filter_by_matches() {
        let db = mem_db().await;

        let mut first = fixture_match(1, MatchStatus::Finished, (2, 0));
        db.upsert_match(&first, true).await.unwrap();
        first.id = 2;
        db.upsert_match(&first, true).await.unwrap();

        let mut other = fixture_match(3, MatchStatus::Finished, (1, 0));
        other.home_player = "third".into();
        other.away_player = "fourth".into();
        db.upsert_match(&other, true).await.unwrap();

        let rankings = db.player_rankings(0).await.unwrap();
        assert_eq!(rankings[0].nickname, "aguuero");
        assert_eq!(rankings[0].wins, 2);

        let regulars = db.player_rankings(2).await.unwrap();
        assert_eq!(regulars.len(), 2);
        assert!(regulars.iter().all(|p| p.matches >= 2));
    }

    #[tokio::test]
    async fn run_log_is_append_only_and_newest_first() {
        let db = mem_db().await;

        for (i, outcome) in [RunOutcome::Success, RunOutcome::Partial].iter().enumerate() {
            let id = db
                .append_run_log(&ScraperLog {
                    id: 0,
                    ran_at: Utc::now(),
                    outcome: *outcome,
                    matches_found: i as i64,
                    matches_new: 0,
                    matches_updated: 0,
                    duration_ms: 12,
                    error: None,
                })
                .await
                .unwrap();
            assert_eq!(id, i as i64 + 1);
        }

        let runs = db.recent_runs(10).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].outcome, RunOutcome::Partial);
        assert_eq!(runs[1].outcome, RunOutcome::Success);

        let capped = db.recent_runs(1).await.unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn purge_deletes_only_rows_past_the_cutoff() {
        let db = mem_db().await;

        let mut old = fixture_match(1, MatchStatus::Finished, (1, 0));
        old.last_seen = Utc::now() - TimeDelta::days(60);
        db.upsert_match(&old, false).await.unwrap();
        db.upsert_match(&fixture_match(2, MatchStatus::Live, (0, 0)), false)
            .await
            .unwrap();

        db.append_run_log(&ScraperLog {
            id: 0,
            ran_at: Utc::now() - TimeDelta::days(60),
            outcome: RunOutcome::Success,
            matches_found: 0,
            matches_new: 0,
            matches_updated: 0,
            duration_ms: 1,
            error: None,
        })
        .await
        .unwrap();

        let cutoff = Utc::now() - TimeDelta::days(30);
        let (matches_deleted, logs_deleted) = db.purge_older_than(cutoff).await.unwrap();

        assert_eq!((matches_deleted, logs_deleted), (1, 1));
        assert!(db.find_match(1).await.unwrap().is_none());
        assert!(db.find_match(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn matches_filter_by_status_and_location() {
        let db = mem_db().await;

        db.upsert_tournaments(&[
            Tournament {
                id: 42,
                name: "Evening Cup".into(),
                location_id: Some(3),
                status: TournamentStatus::Active,
            },
            Tournament {
                id: 43,
                name: "Night Cup".into(),
                location_id: Some(4),
                status: TournamentStatus::Active,
            },
        ])
        .await
        .unwrap();

        db.upsert_match(&fixture_match(1, MatchStatus::Live, (1, 1)), false)
            .await
            .unwrap();
        let mut other_venue = fixture_match(2, MatchStatus::Finished, (2, 0));
        other_venue.tournament_id = 43;
        db.upsert_match(&other_venue, false).await.unwrap();

        let live = db
            .matches_filtered(Some(MatchStatus::Live), None, 50, 0)
            .await
            .unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, 1);

        let at_venue = db.matches_filtered(None, Some(4), 50, 0).await.unwrap();
        assert_eq!(at_venue.len(), 1);
        assert_eq!(at_venue[0].id, 2);

        let all = db.matches_filtered(None, None, 50, 0).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn reference_upserts_replace_in_place() {
        let db = mem_db().await;

        db.upsert_locations(&[Location {
            id: 1,
            name: "Wembley".into(),
            color: None,
        }])
        .await
        .unwrap();
        db.upsert_locations(&[Location {
            id: 1,
            name: "Wembley Intl".into(),
            color: Some("#008080".into()),
        }])
        .await
        .unwrap();

        let locations = db.locations().await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Wembley Intl");

        db.upsert_teams(&[Team {
            id: 7,
            name: "Manchester City".into(),
        }])
        .await
        .unwrap();
        db.upsert_tournaments(&[Tournament {
            id: 42,
            name: "Evening Cup".into(),
            location_id: Some(1),
            status: TournamentStatus::Finished,
        }])
        .await
        .unwrap();

        let tournaments = db.tournaments().await.unwrap();
        assert_eq!(tournaments[0].status, TournamentStatus::Finished);
    }
}
