/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Setup failed: {0}")]
    Setup(String),
}

impl From<browserless_client::BrowserlessError> for ArchiveError {
    fn from(err: browserless_client::BrowserlessError) -> Self {
        ArchiveError::Setup(err.to_string())
    }
}
