//! Filesystem backend: one JSON file per session, written atomically via a
//! temporary file and rename so a crash mid-write never leaves a torn file.

use crate::error::PersistenceError;
use crate::locks::SessionLocks;
use crate::{AnnotationStore, ExportFormat};
use async_trait::async_trait;
use net_est_core::{AuditEntry, Session, Span, StrategyCode, StrategyPrediction};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct FilesystemStore {
    base_dir: PathBuf,
    locks: SessionLocks,
}

impl FilesystemStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            locks: SessionLocks::new(),
        })
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(format!("{session_id}.json"))
    }

    async fn load(&self, session_id: &str) -> Result<Session, PersistenceError> {
        let path = self.path_for(session_id);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|_| PersistenceError::SessionNotFound(session_id.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save(&self, session: &Session) -> Result<(), PersistenceError> {
        let path = self.path_for(&session.session_id);
        let tmp_path = tmp_path(&path);
        let bytes = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[async_trait]
impl AnnotationStore for FilesystemStore {
    async fn seed(&self, session_id: &str, source_text: &str, target_text: &str, predictions: Vec<StrategyPrediction>) -> Result<(), PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;

        if self.load(session_id).await.is_ok() {
            tracing::debug!(session_id, "seed is a no-op: session already exists");
            return Ok(());
        }

        let mut session = Session::new(session_id.to_string(), source_text.to_string(), target_text.to_string());
        session.annotations = predictions;
        self.save(&session).await
    }

    async fn create(&self, session_id: &str, code: StrategyCode, target_offsets: Vec<Span>, comment: Option<String>) -> Result<StrategyPrediction, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(session_id).await?;
        let (prediction, _entry) = crate::transitions::create(&mut session, code, target_offsets, comment)?;
        self.save(&session).await?;
        Ok(prediction)
    }

    async fn accept(&self, session_id: &str, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(session_id).await?;
        let entry = crate::transitions::accept(&mut session, strategy_id)?;
        self.save(&session).await?;
        Ok(entry)
    }

    async fn reject(&self, session_id: &str, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(session_id).await?;
        let entry = crate::transitions::reject(&mut session, strategy_id)?;
        self.save(&session).await?;
        Ok(entry)
    }

    async fn modify_code(&self, session_id: &str, strategy_id: Uuid, new_code: StrategyCode) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(session_id).await?;
        let entry = crate::transitions::modify_code(&mut session, strategy_id, new_code)?;
        self.save(&session).await?;
        Ok(entry)
    }

    async fn modify_span(&self, session_id: &str, strategy_id: Uuid, new_target_offsets: Vec<Span>) -> Result<AuditEntry, PersistenceError> {
        let lock = self.locks.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.load(session_id).await?;
        let entry = crate::transitions::modify_span(&mut session, strategy_id, new_target_offsets)?;
        self.save(&session).await?;
        Ok(entry)
    }

    async fn list_visible(&self, session_id: &str) -> Result<Vec<StrategyPrediction>, PersistenceError> {
        let session = self.load(session_id).await?;
        Ok(session.annotations.into_iter().filter(|p| p.status.is_visible()).collect())
    }

    async fn audit(&self, session_id: &str, strategy_id: Uuid) -> Result<Vec<AuditEntry>, PersistenceError> {
        let session = self.load(session_id).await?;
        if !session.annotations.iter().any(|p| p.strategy_id == strategy_id) {
            return Err(PersistenceError::AnnotationNotFound(strategy_id));
        }
        Ok(session.audit_log.into_iter().filter(|e| e.strategy_id == strategy_id).collect())
    }

    async fn export(&self, session_id: &str, format: ExportFormat) -> Result<String, PersistenceError> {
        let session = self.load(session_id).await?;
        crate::export::export(session_id, &session.annotations, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_est_core::Span;

    async fn new_store() -> FilesystemStore {
        let dir = tempfile::tempdir().unwrap();
        FilesystemStore::new(dir.into_path()).unwrap()
    }

    #[tokio::test]
    async fn seed_is_idempotent() {
        let store = new_store().await;
        store.seed("s1", "fonte", "alvo", vec![]).await.unwrap();
        store.seed("s1", "fonte", "outro alvo", vec![]).await.unwrap();
        let session = store.load("s1").await.unwrap();
        assert_eq!(session.target_text, "alvo");
    }

    #[tokio::test]
    async fn create_then_accept_round_trips_through_disk() {
        let store = new_store().await;
        store.seed("s1", "fonte", "alvo de teste", vec![]).await.unwrap();
        let prediction = store
            .create("s1", StrategyCode::SL, vec![Span::new(0, 4)], Some("manual".to_string()))
            .await
            .unwrap();

        store.accept("s1", prediction.strategy_id).await.unwrap();
        let visible = store.list_visible("s1").await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].status.label(), "accepted");
    }

    #[tokio::test]
    async fn rejected_annotations_are_hidden_from_list_visible() {
        let store = new_store().await;
        store.seed("s1", "fonte", "alvo de teste", vec![]).await.unwrap();
        let prediction = store.create("s1", StrategyCode::RP, vec![Span::new(0, 4)], None).await.unwrap();
        store.reject("s1", prediction.strategy_id).await.unwrap();
        assert!(store.list_visible("s1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn audit_of_unknown_annotation_is_not_found() {
        let store = new_store().await;
        store.seed("s1", "fonte", "alvo de teste", vec![]).await.unwrap();
        let result = store.audit("s1", Uuid::new_v4()).await;
        assert!(matches!(result, Err(PersistenceError::AnnotationNotFound(_))));
    }
}
