//! Session: the unit the Annotation Store persists (spec §3).

use crate::annotation::{AuditEntry, StrategyPrediction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub source_text: String,
    pub target_text: String,
    pub annotations: Vec<StrategyPrediction>,
    pub audit_log: Vec<AuditEntry>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn new(session_id: String, source_text: String, target_text: String) -> Self {
        Self {
            session_id,
            source_text,
            target_text,
            annotations: Vec::new(),
            audit_log: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }
}
