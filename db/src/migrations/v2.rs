use rusqlite::Connection;
use tracing::info;

use super::DbMigration;

/// Add the stream URL column to matches; earlier databases predate stream
/// links in the upstream payload.
pub struct V2;

impl DbMigration for V2 {
    fn do_migration(conn: &Connection) {
        info!("ensuring 'stream_url' column exists on matches");
        let exists = conn
            .prepare("SELECT 1 FROM pragma_table_info('matches') WHERE name = 'stream_url'")
            .and_then(|mut stmt| stmt.exists([]))
            .unwrap_or(false);

        if !exists {
            conn.execute("ALTER TABLE matches ADD COLUMN stream_url TEXT", [])
                .unwrap();
        }
    }
}
