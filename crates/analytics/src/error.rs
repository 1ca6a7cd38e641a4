use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid series: {0}")]
    Core(#[from] CoreError),
}

impl AnalyticsError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidInput(reason.into())
    }
}
