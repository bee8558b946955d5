use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                username    TEXT PRIMARY KEY,
                password    TEXT NOT NULL,
                first_name  TEXT,
                last_name   TEXT,
                is_admin    INTEGER NOT NULL DEFAULT 0
            );

            -- One row per pair, smaller username first
            CREATE TABLE IF NOT EXISTS friends (
                friend1     TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
                friend2     TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
                PRIMARY KEY (friend1, friend2),
                CHECK (friend1 < friend2)
            );

            CREATE INDEX IF NOT EXISTS idx_friends_friend2 ON friends(friend2);

            CREATE TABLE IF NOT EXISTS messages (
                message_id              INTEGER PRIMARY KEY AUTOINCREMENT,
                sender                  TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
                recipient               TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
                subject                 TEXT NOT NULL,
                body                    TEXT NOT NULL,
                read_status             INTEGER NOT NULL DEFAULT 0,
                deleted_for_sender      INTEGER NOT NULL DEFAULT 0,
                deleted_for_recipient   INTEGER NOT NULL DEFAULT 0,
                date_sent               TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_sender
                ON messages(sender, date_sent);
            CREATE INDEX IF NOT EXISTS idx_messages_recipient
                ON messages(recipient, date_sent);

            CREATE TABLE IF NOT EXISTS blog_entries (
                entry_id    INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_blog_entries_username
                ON blog_entries(username);
            ",
        )?;
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [SCHEMA_VERSION])?;
    }

    info!("Database migrations complete");
    Ok(())
}
