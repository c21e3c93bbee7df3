//! Top-level error taxonomy shared by every pipeline crate.
//!
//! Each downstream crate defines its own scoped error enum and converts into
//! this one at the crate boundary via `From`, so callers only ever match on
//! these four kinds regardless of which stage failed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds across the full analysis pipeline.
///
/// Variants map to the four kinds in the error taxonomy: input, resource,
/// logic/transition, internal. The kind, not the message, is what callers
/// should branch on.
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or over-length input text.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Embedding model, linguistic pipeline, or disk unavailable.
    #[error("resource unavailable: {0}")]
    Resource(String),

    /// Unknown strategy code, illegal annotation transition, missing session.
    #[error("illegal transition: {0}")]
    IllegalTransition(String),

    /// Annotation, session, or strategy id not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Character offsets out of range or end <= start.
    #[error("invalid offsets: {0}")]
    InvalidOffsets(String),

    /// Unexpected failure inside a rule, aligner, or store backend.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    pub fn illegal_transition(msg: impl Into<String>) -> Self {
        Error::IllegalTransition(msg.into())
    }

    pub fn invalid_offsets(msg: impl Into<String>) -> Self {
        Error::InvalidOffsets(msg.into())
    }

    /// Whether this error should ever be retried by a caller. Input and
    /// logic/transition errors never should; resource errors sometimes could
    /// be, but the pipeline itself never retries automatically.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_)
                | Error::IllegalTransition(_)
                | Error::NotFound(_)
                | Error::InvalidOffsets(_)
        )
    }
}
