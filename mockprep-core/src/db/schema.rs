//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema (legacy field names)
    r#"
    CREATE TABLE IF NOT EXISTS interviews (
        id                TEXT PRIMARY KEY,
        user_id           TEXT NOT NULL,
        profession_id     TEXT NOT NULL,
        character_id      TEXT NOT NULL,
        status            TEXT NOT NULL DEFAULT 'in_progress',

        started_at        DATETIME NOT NULL,
        completed_at      DATETIME,
        duration_minutes  INTEGER CHECK (duration_minutes >= 0),

        overall_score     REAL CHECK (overall_score BETWEEN 0 AND 100),
        feedback          TEXT NOT NULL DEFAULT '',
        strengths         JSON NOT NULL DEFAULT '[]',
        weaknesses        JSON NOT NULL DEFAULT '[]',

        question_count    INTEGER NOT NULL DEFAULT 0,
        correct_answers   INTEGER NOT NULL DEFAULT 0,

        created_at        DATETIME NOT NULL,
        updated_at        DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_interviews_user_created ON interviews(user_id, created_at DESC);
    CREATE INDEX IF NOT EXISTS idx_interviews_profession ON interviews(profession_id);
    CREATE INDEX IF NOT EXISTS idx_interviews_status ON interviews(status);
    CREATE INDEX IF NOT EXISTS idx_interviews_score ON interviews(overall_score DESC);
    "#,
    // Version 2: Detailed scores; `weaknesses` becomes `improvements`
    r#"
    ALTER TABLE interviews RENAME COLUMN weaknesses TO improvements;
    ALTER TABLE interviews ADD COLUMN technical_score REAL
        CHECK (technical_score BETWEEN 0 AND 100);
    ALTER TABLE interviews ADD COLUMN communication_score REAL
        CHECK (communication_score BETWEEN 0 AND 100);
    ALTER TABLE interviews ADD COLUMN detailedness REAL
        CHECK (detailedness BETWEEN 0 AND 100);
    ALTER TABLE interviews ADD COLUMN recommendation TEXT NOT NULL DEFAULT '';

    CREATE INDEX IF NOT EXISTS idx_interviews_user_status ON interviews(user_id, status, created_at DESC);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
