//! Per-session mutation ordering, shared by every backend (spec §5).
//!
//! A `FilesystemStore` and a `SqliteStore` both serialize concurrent
//! `accept`/`reject`/`modify_*` calls against the same session behind one
//! `tokio::sync::Mutex` held in this registry, keyed by session id.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct SessionLocks {
    registry: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut registry = self.registry.lock().await;
        registry.entry(session_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_session_id_shares_one_lock() {
        let locks = SessionLocks::new();
        let a = locks.lock_for("s1").await;
        let b = locks.lock_for("s1").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn different_session_ids_get_independent_locks() {
        let locks = SessionLocks::new();
        let a = locks.lock_for("s1").await;
        let b = locks.lock_for("s2").await;
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
