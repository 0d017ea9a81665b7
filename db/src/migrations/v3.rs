use rusqlite::Connection;
use tracing::info;

use super::DbMigration;

/// Indexes for the dashboard read paths and the retention pass.
pub struct V3;

impl DbMigration for V3 {
    fn do_migration(conn: &Connection) {
        info!("ensuring read-path indexes exist");
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_matches_status ON matches(status)",
            [],
        )
        .unwrap();
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_matches_last_seen ON matches(last_seen)",
            [],
        )
        .unwrap();
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scraper_logs_ran_at ON scraper_logs(ran_at)",
            [],
        )
        .unwrap();
    }
}
