//! StrategyPrediction / AuditEntry types (spec §3, §9 "heterogeneous statuses").
//!
//! Status is a closed tagged enum, not a nullable-field bag: `Modified` is the
//! only variant that carries `original_code`, which keeps "original_code is
//! non-null iff status = modified" true by construction instead of by convention.

use crate::strategy::StrategyCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Machine,
    Human,
}

/// Annotation lifecycle status. `Modified` is the only variant holding
/// `original_code`, so the invariant in spec §8 holds without a separate check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnnotationStatus {
    Pending,
    Accepted,
    Rejected,
    Modified { original_code: StrategyCode },
    Created,
}

impl AnnotationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AnnotationStatus::Pending => "pending",
            AnnotationStatus::Accepted => "accepted",
            AnnotationStatus::Rejected => "rejected",
            AnnotationStatus::Modified { .. } => "modified",
            AnnotationStatus::Created => "created",
        }
    }

    pub fn original_code(&self) -> Option<StrategyCode> {
        match self {
            AnnotationStatus::Modified { original_code } => Some(*original_code),
            _ => None,
        }
    }

    /// `export` keeps annotations whose status is accepted, modified, or created.
    pub fn is_exportable(&self) -> bool {
        matches!(
            self,
            AnnotationStatus::Accepted | AnnotationStatus::Modified { .. } | AnnotationStatus::Created
        )
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, AnnotationStatus::Rejected)
    }
}

/// Half-open `[start, end)` character span into a document's normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self, max_len: usize) -> bool {
        self.end > self.start && self.end <= max_len
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyPrediction {
    pub strategy_id: Uuid,
    pub code: StrategyCode,
    pub confidence: f64,
    pub evidence: Vec<String>,
    pub target_offsets: Vec<Span>,
    pub source_offsets: Option<Vec<Span>>,
    pub origin: Origin,
    pub status: AnnotationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StrategyPrediction {
    pub fn new_machine(
        code: StrategyCode,
        confidence: f64,
        evidence: Vec<String>,
        target_offsets: Vec<Span>,
        source_offsets: Option<Vec<Span>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            strategy_id: Uuid::new_v4(),
            code,
            confidence: confidence.clamp(0.0, 1.0),
            evidence,
            target_offsets,
            source_offsets,
            origin: Origin::Machine,
            status: AnnotationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_human(code: StrategyCode, target_offsets: Vec<Span>) -> Self {
        let now = Utc::now();
        Self {
            strategy_id: Uuid::new_v4(),
            code,
            confidence: 1.0,
            evidence: vec!["human_created".to_string()],
            target_offsets,
            source_offsets: None,
            origin: Origin::Human,
            status: AnnotationStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Accept,
    Reject,
    ModifyCode,
    ModifySpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub strategy_id: Uuid,
    pub action: AuditAction,
    pub from_status: String,
    pub to_status: String,
    pub from_code: Option<StrategyCode>,
    pub to_code: Option<StrategyCode>,
    pub timestamp: DateTime<Utc>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_code_only_set_when_modified() {
        let pending = AnnotationStatus::Pending;
        assert_eq!(pending.original_code(), None);

        let modified = AnnotationStatus::Modified {
            original_code: StrategyCode::SL,
        };
        assert_eq!(modified.original_code(), Some(StrategyCode::SL));
    }

    #[test]
    fn rejected_is_never_exportable_or_visible() {
        let rejected = AnnotationStatus::Rejected;
        assert!(!rejected.is_exportable());
        assert!(!rejected.is_visible());
    }

    #[test]
    fn span_validity() {
        assert!(Span::new(10, 20).is_valid(30));
        assert!(!Span::new(20, 10).is_valid(30));
        assert!(!Span::new(10, 40).is_valid(30));
    }
}
