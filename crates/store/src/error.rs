use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("annotation not found: {0}")]
    AnnotationNotFound(Uuid),

    #[error("unknown strategy code: {0}")]
    UnknownStrategyCode(String),

    #[error("invalid offsets: {0}")]
    InvalidOffsets(String),

    #[error("illegal status transition: {0}")]
    IllegalTransition(String),

    #[error("schema error: {0}")]
    SchemaError(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv error: {0}")]
    Csv(String),
}

impl From<PersistenceError> for net_est_core::Error {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::SessionNotFound(id) => net_est_core::Error::not_found(format!("session {id}")),
            PersistenceError::AnnotationNotFound(id) => net_est_core::Error::not_found(format!("annotation {id}")),
            PersistenceError::UnknownStrategyCode(code) => net_est_core::Error::invalid_input(format!("unknown strategy code {code}")),
            PersistenceError::InvalidOffsets(msg) => net_est_core::Error::invalid_offsets(msg),
            PersistenceError::IllegalTransition(msg) => net_est_core::Error::illegal_transition(msg),
            other => net_est_core::Error::Internal(other.to_string()),
        }
    }
}
