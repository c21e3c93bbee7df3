use serde::{Deserialize, Serialize};

/// One stage of the orchestrator's run, kept for the audit trail returned
/// alongside a session's initial classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTrace {
    pub name: String,
    pub detail: String,
    pub duration_ms: u64,
    pub truncated: bool,
}
