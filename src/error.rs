use thiserror::Error;

/// Main error type for the crate.
/// Aggregates errors from dependencies and internal modules.
#[derive(Error, Debug)]
pub enum TabularError {
    #[error("{0}")]
    WithContextError(String),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Join module errors
    #[error("{0}")]
    JoinError(#[from] crate::join::JoinError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TabularError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| TabularError::WithContextError(format!("{}: {}", message, e)))
    }
}
