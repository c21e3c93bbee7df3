use thiserror::Error;

#[derive(Error, Debug)]
pub enum TextError {
    #[error("input text is empty after normalization")]
    Empty,

    #[error("input text exceeds maximum word count: {actual} > {max}")]
    TooLong { actual: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, TextError>;

impl From<TextError> for net_est_core::Error {
    fn from(err: TextError) -> Self {
        net_est_core::Error::invalid_input(err.to_string())
    }
}
