//! Bulk migration from a filesystem-backed deployment to the relational one.
//!
//! Walks every `*.json` session file, seeds its final annotation state into
//! the target store, then copies its audit log verbatim so the two backends
//! carry the same history rather than just the same final snapshot.

use crate::error::PersistenceError;
use crate::{AnnotationStore, SqliteStore};
use net_est_core::Session;
use std::path::Path;

pub async fn migrate_filesystem_to_sqlite(source_dir: impl AsRef<Path>, target: &SqliteStore) -> Result<usize, PersistenceError> {
    let mut migrated = 0;
    let mut entries = tokio::fs::read_dir(source_dir.as_ref()).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let bytes = tokio::fs::read(&path).await?;
        let session: Session = serde_json::from_slice(&bytes)?;

        target
            .seed(&session.session_id, &session.source_text, &session.target_text, session.annotations.clone())
            .await?;
        target.copy_audit_entries(&session.session_id, &session.audit_log).await?;

        migrated += 1;
    }

    tracing::info!(migrated, "filesystem sessions migrated to sqlite");
    Ok(migrated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilesystemStore;
    use net_est_core::{Span, StrategyCode};

    #[tokio::test]
    async fn migrates_sessions_and_preserves_audit_history() {
        let dir = tempfile::tempdir().unwrap();
        let fs_store = FilesystemStore::new(dir.path()).unwrap();

        fs_store.seed("s1", "fonte", "alvo de teste", vec![]).await.unwrap();
        let prediction = fs_store.create("s1", StrategyCode::SL, vec![Span::new(0, 4)], None).await.unwrap();
        fs_store.accept("s1", prediction.strategy_id).await.unwrap();

        let sqlite_store = SqliteStore::in_memory().unwrap();
        let migrated = migrate_filesystem_to_sqlite(dir.path(), &sqlite_store).await.unwrap();
        assert_eq!(migrated, 1);

        let visible = sqlite_store.list_visible("s1").await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].status.label(), "accepted");

        let audit = sqlite_store.audit("s1", prediction.strategy_id).await.unwrap();
        assert_eq!(audit.len(), 2);
    }
}
