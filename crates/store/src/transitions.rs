//! Pure status-transition logic shared by both backends, so the invariants in
//! spec §8 ("exactly one audit entry per mutation", "modified carries
//! original_code") hold identically regardless of where a session lives.

use crate::error::PersistenceError;
use chrono::Utc;
use net_est_core::{AnnotationStatus, AuditAction, AuditEntry, Session, Span, StrategyCode, StrategyPrediction};
use uuid::Uuid;

fn find_mut<'a>(session: &'a mut Session, strategy_id: Uuid) -> Result<&'a mut StrategyPrediction, PersistenceError> {
    session
        .annotations
        .iter_mut()
        .find(|p| p.strategy_id == strategy_id)
        .ok_or(PersistenceError::AnnotationNotFound(strategy_id))
}

fn validate_offsets(offsets: &[Span], max_len: usize) -> Result<(), PersistenceError> {
    if offsets.is_empty() {
        return Err(PersistenceError::InvalidOffsets("at least one span is required".to_string()));
    }
    for span in offsets {
        if !span.is_valid(max_len) {
            return Err(PersistenceError::InvalidOffsets(format!(
                "span [{}, {}) invalid for text of length {}",
                span.start, span.end, max_len
            )));
        }
    }
    Ok(())
}

pub fn create(
    session: &mut Session,
    code: StrategyCode,
    target_offsets: Vec<Span>,
    comment: Option<String>,
) -> Result<(StrategyPrediction, AuditEntry), PersistenceError> {
    let max_len = session.target_text.chars().count();
    validate_offsets(&target_offsets, max_len)?;

    let prediction = StrategyPrediction::new_human(code, target_offsets);
    let entry = AuditEntry {
        strategy_id: prediction.strategy_id,
        action: AuditAction::Create,
        from_status: "none".to_string(),
        to_status: prediction.status.label().to_string(),
        from_code: None,
        to_code: Some(code),
        timestamp: Utc::now(),
        comment,
    };

    session.annotations.push(prediction.clone());
    session.audit_log.push(entry.clone());
    Ok((prediction, entry))
}

pub fn accept(session: &mut Session, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError> {
    let prediction = find_mut(session, strategy_id)?;
    if !matches!(prediction.status, AnnotationStatus::Pending) {
        return Err(PersistenceError::IllegalTransition(format!(
            "cannot accept annotation in status {}",
            prediction.status.label()
        )));
    }

    let from_status = prediction.status.label().to_string();
    prediction.status = AnnotationStatus::Accepted;
    prediction.updated_at = Utc::now();

    let entry = AuditEntry {
        strategy_id,
        action: AuditAction::Accept,
        from_status,
        to_status: prediction.status.label().to_string(),
        from_code: None,
        to_code: None,
        timestamp: Utc::now(),
        comment: None,
    };
    session.audit_log.push(entry.clone());
    Ok(entry)
}

pub fn reject(session: &mut Session, strategy_id: Uuid) -> Result<AuditEntry, PersistenceError> {
    let prediction = find_mut(session, strategy_id)?;
    let from_status = prediction.status.label().to_string();
    prediction.status = AnnotationStatus::Rejected;
    prediction.updated_at = Utc::now();

    let entry = AuditEntry {
        strategy_id,
        action: AuditAction::Reject,
        from_status,
        to_status: prediction.status.label().to_string(),
        from_code: None,
        to_code: None,
        timestamp: Utc::now(),
        comment: None,
    };
    session.audit_log.push(entry.clone());
    Ok(entry)
}

pub fn modify_code(session: &mut Session, strategy_id: Uuid, new_code: StrategyCode) -> Result<AuditEntry, PersistenceError> {
    let prediction = find_mut(session, strategy_id)?;
    let from_status = prediction.status.label().to_string();
    let from_code = prediction.code;

    let original_code = prediction.status.original_code().unwrap_or(from_code);
    prediction.code = new_code;
    prediction.status = AnnotationStatus::Modified { original_code };
    prediction.updated_at = Utc::now();

    let entry = AuditEntry {
        strategy_id,
        action: AuditAction::ModifyCode,
        from_status,
        to_status: prediction.status.label().to_string(),
        from_code: Some(from_code),
        to_code: Some(new_code),
        timestamp: Utc::now(),
        comment: None,
    };
    session.audit_log.push(entry.clone());
    Ok(entry)
}

pub fn modify_span(session: &mut Session, strategy_id: Uuid, new_target_offsets: Vec<Span>) -> Result<AuditEntry, PersistenceError> {
    let max_len = session.target_text.chars().count();
    validate_offsets(&new_target_offsets, max_len)?;

    let prediction = find_mut(session, strategy_id)?;
    let from_status = prediction.status.label().to_string();

    prediction.target_offsets = new_target_offsets;
    if matches!(prediction.status, AnnotationStatus::Pending) {
        prediction.status = AnnotationStatus::Modified { original_code: prediction.code };
    }
    prediction.updated_at = Utc::now();

    let entry = AuditEntry {
        strategy_id,
        action: AuditAction::ModifySpan,
        from_status,
        to_status: prediction.status.label().to_string(),
        from_code: None,
        to_code: None,
        timestamp: Utc::now(),
        comment: None,
    };
    session.audit_log.push(entry.clone());
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_pending(code: StrategyCode) -> (Session, Uuid) {
        let mut session = Session::new("s1".to_string(), "fonte".to_string(), "alvo de teste".to_string());
        let pred = StrategyPrediction::new_machine(code, 0.8, vec![], vec![Span::new(0, 4)], None);
        let id = pred.strategy_id;
        session.annotations.push(pred);
        (session, id)
    }

    #[test]
    fn accept_on_modified_is_illegal() {
        let (mut session, id) = session_with_pending(StrategyCode::SL);
        modify_code(&mut session, id, StrategyCode::RP).unwrap();
        let result = accept(&mut session, id);
        assert!(matches!(result, Err(PersistenceError::IllegalTransition(_))));
        assert_eq!(session.audit_log.len(), 1);
    }

    #[test]
    fn modify_code_sets_original_code_once() {
        let (mut session, id) = session_with_pending(StrategyCode::SL);
        modify_code(&mut session, id, StrategyCode::RP).unwrap();
        modify_code(&mut session, id, StrategyCode::MOD).unwrap();
        let pred = session.annotations.iter().find(|p| p.strategy_id == id).unwrap();
        assert_eq!(pred.status.original_code(), Some(StrategyCode::SL));
        assert_eq!(pred.code, StrategyCode::MOD);
    }

    #[test]
    fn modify_span_rejects_out_of_range_offsets() {
        let (mut session, id) = session_with_pending(StrategyCode::SL);
        let result = modify_span(&mut session, id, vec![Span::new(0, 999)]);
        assert!(matches!(result, Err(PersistenceError::InvalidOffsets(_))));
    }

    #[test]
    fn each_mutation_appends_exactly_one_audit_entry() {
        let (mut session, id) = session_with_pending(StrategyCode::SL);
        accept(&mut session, id).unwrap();
        assert_eq!(session.audit_log.len(), 1);
        reject(&mut session, id).unwrap();
        assert_eq!(session.audit_log.len(), 2);
    }
}
