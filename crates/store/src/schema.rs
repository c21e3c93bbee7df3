//! SQLite schema creation, adapted from this codebase's DDL-in-a-function
//! convention to a single-file relational backend.

use crate::error::PersistenceError;
use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            session_id TEXT PRIMARY KEY,
            source_text TEXT NOT NULL,
            target_text TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS annotations (
            strategy_id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES sessions(session_id),
            code TEXT NOT NULL,
            confidence REAL NOT NULL,
            evidence_json TEXT NOT NULL,
            target_offsets_json TEXT NOT NULL,
            source_offsets_json TEXT,
            origin TEXT NOT NULL,
            status_json TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_annotations_session ON annotations(session_id);

        CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL REFERENCES sessions(session_id),
            strategy_id TEXT NOT NULL,
            action TEXT NOT NULL,
            from_status TEXT NOT NULL,
            to_status TEXT NOT NULL,
            from_code TEXT,
            to_code TEXT,
            timestamp TEXT NOT NULL,
            comment TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_audit_log_strategy ON audit_log(session_id, strategy_id, timestamp);
        "#,
    )
    .map_err(|e| PersistenceError::SchemaError(e.to_string()))?;

    tracing::info!("sqlite schema ensured");
    Ok(())
}
