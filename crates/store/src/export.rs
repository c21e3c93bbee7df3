//! Export serialization shared by both backends (spec §4.6 `export`).

use crate::error::PersistenceError;
use net_est_core::{Span, StrategyPrediction};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jsonl,
    Csv,
}

/// Flat record matching the §6 export schema. Built from a `StrategyPrediction`
/// plus the session id the store already knows and the prediction itself
/// doesn't carry.
#[derive(Serialize)]
struct ExportRecord<'a> {
    session_id: &'a str,
    strategy_id: String,
    code: &'static str,
    status: &'static str,
    origin: &'static str,
    target_offsets: String,
    source_offsets: String,
    confidence: f64,
    evidence: String,
    original_code: Option<&'static str>,
    created_at: String,
    updated_at: String,
}

fn offsets_to_string(spans: &[Span]) -> String {
    spans.iter().map(|s| format!("{}-{}", s.start, s.end)).collect::<Vec<_>>().join(";")
}

fn to_record<'a>(session_id: &'a str, prediction: &'a StrategyPrediction) -> ExportRecord<'a> {
    ExportRecord {
        session_id,
        strategy_id: prediction.strategy_id.to_string(),
        code: prediction.code.as_tag(),
        status: prediction.status.label(),
        origin: match prediction.origin {
            net_est_core::Origin::Machine => "machine",
            net_est_core::Origin::Human => "human",
        },
        target_offsets: offsets_to_string(&prediction.target_offsets),
        source_offsets: prediction.source_offsets.as_deref().map(offsets_to_string).unwrap_or_default(),
        confidence: prediction.confidence,
        evidence: prediction.evidence.join("; "),
        original_code: prediction.status.original_code().map(|c| c.as_tag()),
        created_at: prediction.created_at.to_rfc3339(),
        updated_at: prediction.updated_at.to_rfc3339(),
    }
}

pub fn exportable(predictions: &[StrategyPrediction]) -> Vec<&StrategyPrediction> {
    predictions.iter().filter(|p| p.status.is_exportable()).collect()
}

pub fn export(session_id: &str, predictions: &[StrategyPrediction], format: ExportFormat) -> Result<String, PersistenceError> {
    let subset = exportable(predictions);
    match format {
        ExportFormat::Jsonl => {
            let mut out = String::new();
            for prediction in subset {
                out.push_str(&serde_json::to_string(&to_record(session_id, prediction))?);
                out.push('\n');
            }
            Ok(out)
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for prediction in subset {
                let record = to_record(session_id, prediction);
                writer.serialize(record).map_err(|e| PersistenceError::Csv(e.to_string()))?;
            }
            let bytes = writer.into_inner().map_err(|e| PersistenceError::Csv(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| PersistenceError::Csv(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use net_est_core::{AnnotationStatus, Span, StrategyCode};

    #[test]
    fn excludes_rejected_and_pending() {
        let mut accepted = StrategyPrediction::new_machine(StrategyCode::SL, 0.8, vec![], vec![Span::new(0, 2)], None);
        accepted.status = AnnotationStatus::Accepted;
        let pending = StrategyPrediction::new_machine(StrategyCode::RP, 0.6, vec![], vec![Span::new(0, 2)], None);
        let mut rejected = StrategyPrediction::new_machine(StrategyCode::MOD, 0.6, vec![], vec![Span::new(0, 2)], None);
        rejected.status = AnnotationStatus::Rejected;

        let predictions = vec![accepted, pending, rejected];
        let subset = exportable(&predictions);
        assert_eq!(subset.len(), 1);
    }

    #[test]
    fn jsonl_has_one_line_per_exportable_annotation() {
        let mut p = StrategyPrediction::new_machine(StrategyCode::SL, 0.8, vec![], vec![Span::new(0, 2)], None);
        p.status = AnnotationStatus::Accepted;
        let out = export("sess-1", &[p], ExportFormat::Jsonl).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn jsonl_record_is_flat_with_session_id_and_original_code() {
        let mut p = StrategyPrediction::new_machine(StrategyCode::SL, 0.8, vec![], vec![Span::new(0, 2)], None);
        p.status = AnnotationStatus::Modified { original_code: StrategyCode::RP };
        let out = export("sess-1", &[p], ExportFormat::Jsonl).unwrap();
        let line = out.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["session_id"], "sess-1");
        assert_eq!(value["status"], "modified");
        assert_eq!(value["original_code"], "RP+");
    }
}
