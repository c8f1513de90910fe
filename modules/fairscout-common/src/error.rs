use thiserror::Error;

#[derive(Error, Debug)]
pub enum FairScoutError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of a single collaborator call. Never fatal to a run: the
/// orchestrator turns each of these into a log entry or blocked-URL record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Timeout, DNS, connection reset, or a missing browser runtime.
    #[error("Network failure: {0}")]
    Network(String),

    #[error("HTTP {status}: {reason}")]
    HttpBlocked { status: u16, reason: String },

    /// PDF decode error or a response that could not be interpreted.
    #[error("Parse failure: {0}")]
    Parse(String),

    #[error("Payload too large: {bytes} bytes exceeds limit of {limit}")]
    TooLarge { bytes: u64, limit: u64 },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpBlocked { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short machine-friendly label used in blocked-URL reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::HttpBlocked { .. } => "http_blocked",
            FetchError::Parse(_) => "parse",
            FetchError::TooLarge { .. } => "too_large",
        }
    }
}
