//! Annotation Store and Audit Log (spec §4.6).
//!
//! `AnnotationStore` is implemented twice, by [`FilesystemStore`] (one JSON
//! file per session) and [`SqliteStore`] (relational). Both share the pure
//! transition logic in `transitions`, so "accept a pending annotation",
//! "modify_code sets original_code exactly once", and "exactly one audit
//! entry per mutation" hold identically regardless of backend.

mod error;
mod export;
mod fs_store;
mod locks;
mod migrate;
mod schema;
mod sqlite_store;
mod transitions;

pub use error::PersistenceError;
pub use export::ExportFormat;
pub use fs_store::FilesystemStore;
pub use migrate::migrate_filesystem_to_sqlite;
pub use sqlite_store::SqliteStore;

use async_trait::async_trait;
use net_est_core::{AuditEntry, Span, StrategyCode, StrategyPrediction};
use uuid::Uuid;

/// The nine operations a session's annotation lifecycle is built from.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    /// Writes a freshly-classified session. No-op if the session already exists.
    async fn seed(&self, session_id: &str, source_text: &str, target_text: &str, predictions: Vec<StrategyPrediction>) -> Result<(), PersistenceError>;

    /// Adds a human-authored annotation, starting in `Created` status.
    async fn create(&self, session_id: &str, code: StrategyCode, target_offsets: Vec<Span>, comment: Option<String>) -> Result<StrategyPrediction, PersistenceError>;

    /// Moves a `Pending` annotation to `Accepted`. Any other starting status is an `IllegalTransition`.
    async fn accept(&self, session_id: &str, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError>;

    /// Moves an annotation to `Rejected` from any status.
    async fn reject(&self, session_id: &str, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError>;

    /// Changes an annotation's tag, setting `original_code` on first modification only.
    async fn modify_code(&self, session_id: &str, strategy_id: Uuid, new_code: StrategyCode) -> Result<AuditEntry, PersistenceError>;

    /// Changes an annotation's target span, validating against the target text length.
    async fn modify_span(&self, session_id: &str, strategy_id: Uuid, new_target_offsets: Vec<Span>) -> Result<AuditEntry, PersistenceError>;

    /// Lists every non-rejected annotation for a session.
    async fn list_visible(&self, session_id: &str) -> Result<Vec<StrategyPrediction>, PersistenceError>;

    /// Returns the full audit trail for one annotation, oldest first.
    async fn audit(&self, session_id: &str, strategy_id: Uuid) -> Result<Vec<AuditEntry>, PersistenceError>;

    /// Serializes every accepted, modified, or human-created annotation.
    async fn export(&self, session_id: &str, format: ExportFormat) -> Result<String, PersistenceError>;
}
