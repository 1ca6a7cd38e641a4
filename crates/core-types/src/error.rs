use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Series length mismatch: index has {index} timestamps but {values} values were supplied")]
    LengthMismatch { index: usize, values: usize },
}
