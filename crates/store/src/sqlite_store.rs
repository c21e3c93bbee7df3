//! SQLite backend. Each mutation reconstructs a minimal in-memory `Session`
//! scoped to the one annotation being touched, runs it through the same
//! transition functions the filesystem backend uses, then writes back only
//! the changed annotation row plus the new audit row.

use crate::error::PersistenceError;
use crate::locks::SessionLocks;
use crate::{AnnotationStore, ExportFormat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use net_est_core::{AnnotationStatus, AuditAction, AuditEntry, Origin, Session, Span, StrategyCode, StrategyPrediction};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

pub struct SqliteStore {
    conn: Arc<AsyncMutex<Connection>>,
    locks: SessionLocks,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        crate::schema::create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(AsyncMutex::new(conn)),
            locks: SessionLocks::new(),
        })
    }

    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::create_tables(&conn)?;
        Ok(Self {
            conn: Arc::new(AsyncMutex::new(conn)),
            locks: SessionLocks::new(),
        })
    }
}

fn action_to_str(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Create => "create",
        AuditAction::Accept => "accept",
        AuditAction::Reject => "reject",
        AuditAction::ModifyCode => "modify_code",
        AuditAction::ModifySpan => "modify_span",
    }
}

fn action_from_str(s: &str) -> Result<AuditAction, PersistenceError> {
    match s {
        "create" => Ok(AuditAction::Create),
        "accept" => Ok(AuditAction::Accept),
        "reject" => Ok(AuditAction::Reject),
        "modify_code" => Ok(AuditAction::ModifyCode),
        "modify_span" => Ok(AuditAction::ModifySpan),
        other => Err(PersistenceError::SchemaError(format!("unknown audit action {other}"))),
    }
}

struct RawAnnotation {
    strategy_id: String,
    code: String,
    confidence: f64,
    evidence_json: String,
    target_offsets_json: String,
    source_offsets_json: Option<String>,
    origin: String,
    status_json: String,
    created_at: String,
    updated_at: String,
}

impl RawAnnotation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            strategy_id: row.get("strategy_id")?,
            code: row.get("code")?,
            confidence: row.get("confidence")?,
            evidence_json: row.get("evidence_json")?,
            target_offsets_json: row.get("target_offsets_json")?,
            source_offsets_json: row.get("source_offsets_json")?,
            origin: row.get("origin")?,
            status_json: row.get("status_json")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_prediction(self) -> Result<StrategyPrediction, PersistenceError> {
        let code = StrategyCode::from_tag(&self.code).ok_or_else(|| PersistenceError::UnknownStrategyCode(self.code.clone()))?;
        let source_offsets: Option<Vec<Span>> = match self.source_offsets_json {
            Some(json) => serde_json::from_str(&json)?,
            None => None,
        };
        Ok(StrategyPrediction {
            strategy_id: Uuid::parse_str(&self.strategy_id).map_err(|e| PersistenceError::SchemaError(e.to_string()))?,
            code,
            confidence: self.confidence,
            evidence: serde_json::from_str(&self.evidence_json)?,
            target_offsets: serde_json::from_str(&self.target_offsets_json)?,
            source_offsets,
            origin: match self.origin.as_str() {
                "human" => Origin::Human,
                _ => Origin::Machine,
            },
            status: serde_json::from_str::<AnnotationStatus>(&self.status_json)?,
            created_at: self.created_at.parse::<DateTime<Utc>>().map_err(|e| PersistenceError::SchemaError(e.to_string()))?,
            updated_at: self.updated_at.parse::<DateTime<Utc>>().map_err(|e| PersistenceError::SchemaError(e.to_string()))?,
        })
    }
}

fn write_prediction(conn: &Connection, session_id: &str, prediction: &StrategyPrediction, insert: bool) -> Result<(), PersistenceError> {
    let source_offsets_json = serde_json::to_string(&prediction.source_offsets)?;
    let origin = match prediction.origin {
        Origin::Machine => "machine",
        Origin::Human => "human",
    };
    let params = params![
        prediction.strategy_id.to_string(),
        session_id,
        prediction.code.as_tag(),
        prediction.confidence,
        serde_json::to_string(&prediction.evidence)?,
        serde_json::to_string(&prediction.target_offsets)?,
        source_offsets_json,
        origin,
        serde_json::to_string(&prediction.status)?,
        prediction.created_at.to_rfc3339(),
        prediction.updated_at.to_rfc3339(),
    ];

    if insert {
        conn.execute(
            "INSERT INTO annotations (strategy_id, session_id, code, confidence, evidence_json, target_offsets_json, source_offsets_json, origin, status_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(strategy_id) DO NOTHING",
            params,
        )?;
    } else {
        conn.execute(
            "UPDATE annotations SET code = ?3, confidence = ?4, evidence_json = ?5, target_offsets_json = ?6,
             source_offsets_json = ?7, origin = ?8, status_json = ?9, updated_at = ?11
             WHERE strategy_id = ?1 AND session_id = ?2",
            params,
        )?;
    }
    Ok(())
}

fn write_audit_entry(conn: &Connection, session_id: &str, entry: &AuditEntry) -> Result<(), PersistenceError> {
    conn.execute(
        "INSERT INTO audit_log (session_id, strategy_id, action, from_status, to_status, from_code, to_code, timestamp, comment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            session_id,
            entry.strategy_id.to_string(),
            action_to_str(entry.action),
            entry.from_status,
            entry.to_status,
            entry.from_code.map(|c| c.as_tag().to_string()),
            entry.to_code.map(|c| c.as_tag().to_string()),
            entry.timestamp.to_rfc3339(),
            entry.comment,
        ],
    )?;
    Ok(())
}

fn query_target_text(conn: &Connection, session_id: &str) -> Result<String, PersistenceError> {
    conn.query_row("SELECT target_text FROM sessions WHERE session_id = ?1", params![session_id], |row| row.get(0))
        .optional()?
        .ok_or_else(|| PersistenceError::SessionNotFound(session_id.to_string()))
}

fn query_annotation(conn: &Connection, session_id: &str, strategy_id: Uuid) -> Result<StrategyPrediction, PersistenceError> {
    let raw = conn
        .query_row(
            "SELECT * FROM annotations WHERE session_id = ?1 AND strategy_id = ?2",
            params![session_id, strategy_id.to_string()],
            RawAnnotation::from_row,
        )
        .optional()?
        .ok_or(PersistenceError::AnnotationNotFound(strategy_id))?;
    raw.into_prediction()
}

#[async_trait]
impl AnnotationStore for SqliteStore {
    async fn seed(&self, session_id: &str, source_text: &str, target_text: &str, predictions: Vec<StrategyPrediction>) -> Result<(), PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO sessions (session_id, source_text, target_text, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(session_id) DO NOTHING",
            params![session_id, source_text, target_text, Utc::now().to_rfc3339()],
        )?;
        for prediction in &predictions {
            write_prediction(&conn, session_id, prediction, true)?;
        }
        Ok(())
    }

    async fn create(&self, session_id: &str, code: StrategyCode, target_offsets: Vec<Span>, comment: Option<String>) -> Result<StrategyPrediction, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;
        let conn = self.conn.lock().await;

        let target_text = query_target_text(&conn, session_id)?;
        let mut shadow = Session::new(session_id.to_string(), String::new(), target_text);
        let (prediction, entry) = crate::transitions::create(&mut shadow, code, target_offsets, comment)?;

        write_prediction(&conn, session_id, &prediction, true)?;
        write_audit_entry(&conn, session_id, &entry)?;
        Ok(prediction)
    }

    async fn accept(&self, session_id: &str, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;
        let conn = self.conn.lock().await;

        let existing = query_annotation(&conn, session_id, strategy_id)?;
        let mut shadow = Session::new(session_id.to_string(), String::new(), String::new());
        shadow.annotations.push(existing);
        let entry = crate::transitions::accept(&mut shadow, strategy_id)?;

        write_prediction(&conn, session_id, &shadow.annotations[0], false)?;
        write_audit_entry(&conn, session_id, &entry)?;
        Ok(entry)
    }

    async fn reject(&self, session_id: &str, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;
        let conn = self.conn.lock().await;

        let existing = query_annotation(&conn, session_id, strategy_id)?;
        let mut shadow = Session::new(session_id.to_string(), String::new(), String::new());
        shadow.annotations.push(existing);
        let entry = crate::transitions::reject(&mut shadow, strategy_id)?;

        write_prediction(&conn, session_id, &shadow.annotations[0], false)?;
        write_audit_entry(&conn, session_id, &entry)?;
        Ok(entry)
    }

    async fn modify_code(&self, session_id: &str, strategy_id: Uuid, new_code: StrategyCode) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;
        let conn = self.conn.lock().await;

        let existing = query_annotation(&conn, session_id, strategy_id)?;
        let mut shadow = Session::new(session_id.to_string(), String::new(), String::new());
        shadow.annotations.push(existing);
        let entry = crate::transitions::modify_code(&mut shadow, strategy_id, new_code)?;

        write_prediction(&conn, session_id, &shadow.annotations[0], false)?;
        write_audit_entry(&conn, session_id, &entry)?;
        Ok(entry)
    }

    async fn modify_span(&self, session_id: &str, strategy_id: Uuid, new_target_offsets: Vec<Span>) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;
        let conn = self.conn.lock().await;

        let target_text = query_target_text(&conn, session_id)?;
        let existing = query_annotation(&conn, session_id, strategy_id)?;
        let mut shadow = Session::new(session_id.to_string(), String::new(), target_text);
        shadow.annotations.push(existing);
        let entry = crate::transitions::modify_span(&mut shadow, strategy_id, new_target_offsets)?;

        write_prediction(&conn, session_id, &shadow.annotations[0], false)?;
        write_audit_entry(&conn, session_id, &entry)?;
        Ok(entry)
    }

    async fn list_visible(&self, session_id: &str) -> Result<Vec<StrategyPrediction>, PersistenceError> {
        let conn = self.conn.lock().await;
        if query_target_text(&conn, session_id).is_err() {
            return Err(PersistenceError::SessionNotFound(session_id.to_string()));
        }
        let mut stmt = conn.prepare("SELECT * FROM annotations WHERE session_id = ?1")?;
        let rows = stmt.query_map(params![session_id], RawAnnotation::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            let prediction = row?.into_prediction()?;
            if prediction.status.is_visible() {
                out.push(prediction);
            }
        }
        Ok(out)
    }

    async fn audit(&self, session_id: &str, strategy_id: Uuid) -> Result<Vec<AuditEntry>, PersistenceError> {
        let conn = self.conn.lock().await;
        query_annotation(&conn, session_id, strategy_id)?;

        let mut stmt = conn.prepare("SELECT * FROM audit_log WHERE session_id = ?1 AND strategy_id = ?2 ORDER BY id ASC")?;
        let rows = stmt.query_map(params![session_id, strategy_id.to_string()], |row| {
            let from_code: Option<String> = row.get("from_code")?;
            let to_code: Option<String> = row.get("to_code")?;
            let action: String = row.get("action")?;
            let timestamp: String = row.get("timestamp")?;
            Ok((action, row.get::<_, String>("from_status")?, row.get::<_, String>("to_status")?, from_code, to_code, timestamp, row.get::<_, Option<String>>("comment")?))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (action, from_status, to_status, from_code, to_code, timestamp, comment) = row?;
            out.push(AuditEntry {
                strategy_id,
                action: action_from_str(&action)?,
                from_status,
                to_status,
                from_code: from_code.and_then(|c| StrategyCode::from_tag(&c)),
                to_code: to_code.and_then(|c| StrategyCode::from_tag(&c)),
                timestamp: timestamp.parse::<DateTime<Utc>>().map_err(|e| PersistenceError::SchemaError(e.to_string()))?,
                comment,
            });
        }
        Ok(out)
    }

    async fn export(&self, session_id: &str, format: ExportFormat) -> Result<String, PersistenceError> {
        let predictions = self.list_visible_including_rejected(session_id).await?;
        crate::export::export(session_id, &predictions, format)
    }
}

impl SqliteStore {
    /// Bulk-copies already-recorded audit rows during migration. Bypasses the
    /// transition functions deliberately: these entries were validated once,
    /// by whichever backend produced them, and re-running them here would
    /// just fail against state they already describe.
    pub async fn copy_audit_entries(&self, session_id: &str, entries: &[AuditEntry]) -> Result<(), PersistenceError> {
        let conn = self.conn.lock().await;
        for entry in entries {
            write_audit_entry(&conn, session_id, entry)?;
        }
        Ok(())
    }

    async fn list_visible_including_rejected(&self, session_id: &str) -> Result<Vec<StrategyPrediction>, PersistenceError> {
        let conn = self.conn.lock().await;
        if query_target_text(&conn, session_id).is_err() {
            return Err(PersistenceError::SessionNotFound(session_id.to_string()));
        }
        let mut stmt = conn.prepare("SELECT * FROM annotations WHERE session_id = ?1")?;
        let rows = stmt.query_map(params![session_id], RawAnnotation::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_prediction()?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_est_core::Span;

    #[tokio::test]
    async fn seed_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        store.seed("s1", "fonte", "alvo", vec![]).await.unwrap();
        store.seed("s1", "fonte", "outro alvo", vec![]).await.unwrap();
        let conn = store.conn.lock().await;
        let target_text: String = conn.query_row("SELECT target_text FROM sessions WHERE session_id = 's1'", [], |row| row.get(0)).unwrap();
        assert_eq!(target_text, "alvo");
    }

    #[tokio::test]
    async fn create_accept_and_export_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        store.seed("s1", "fonte", "alvo de teste", vec![]).await.unwrap();
        let prediction = store.create("s1", StrategyCode::SL, vec![Span::new(0, 4)], None).await.unwrap();
        store.accept("s1", prediction.strategy_id).await.unwrap();

        let visible = store.list_visible("s1").await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].status.label(), "accepted");

        let exported = store.export("s1", ExportFormat::Jsonl).await.unwrap();
        assert_eq!(exported.lines().count(), 1);
    }

    #[tokio::test]
    async fn modify_code_is_reflected_in_audit_log() {
        let store = SqliteStore::in_memory().unwrap();
        store.seed("s1", "fonte", "alvo de teste", vec![]).await.unwrap();
        let prediction = store.create("s1", StrategyCode::SL, vec![Span::new(0, 4)], None).await.unwrap();
        store.modify_code("s1", prediction.strategy_id, StrategyCode::RP).await.unwrap();

        let entries = store.audit("s1", prediction.strategy_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].to_code, Some(StrategyCode::RP));
    }
}
