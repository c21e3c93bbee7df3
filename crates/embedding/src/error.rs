use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

impl From<EmbeddingError> for net_est_core::Error {
    fn from(err: EmbeddingError) -> Self {
        net_est_core::Error::Resource(err.to_string())
    }
}
