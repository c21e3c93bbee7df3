use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("preprocessing failed: {0}")]
    Text(#[from] net_est_text::TextError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] net_est_embedding::EmbeddingError),

    #[error("persistence failed: {0}")]
    Persistence(#[from] net_est_store::PersistenceError),

    #[error("stage '{0}' exceeded its time budget")]
    StageTimeout(String),

    #[error("worker pool is shut down")]
    WorkerPoolClosed,
}

impl From<PipelineError> for net_est_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Text(e) => e.into(),
            PipelineError::Embedding(e) => e.into(),
            PipelineError::Persistence(e) => e.into(),
            PipelineError::StageTimeout(stage) => net_est_core::Error::Internal(format!("stage '{stage}' timed out")),
            PipelineError::WorkerPoolClosed => net_est_core::Error::Internal("worker pool closed".to_string()),
        }
    }
}
