use thiserror::Error;

/// Coarse classification of an [`IngestError`], used by the poll loop to
/// decide how a failed iteration is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Lookup,
    Parse,
    Persistence,
    Malformed,
}

/// Errors raised while fetching, converting or persisting prices
#[derive(Debug, Error)]
pub enum IngestError {
    /// Upstream request failed, returned a non-200 status or a non-JSON body
    #[error("Transport error: {0}")]
    Transport(String),

    /// Record names an exchange that is not in the endpoint table
    #[error("Unknown exchange id: {0}")]
    Lookup(String),

    /// Price quote could not be read as a finite number
    #[error("Invalid price quote {value:?}: {reason}")]
    Parse { value: String, reason: String },

    /// Time-series database did not acknowledge the write
    #[error("An error occurred during writing: {point} ({reason})")]
    Persistence { point: String, reason: String },

    /// Response body did not have the expected market record shape
    #[error("Malformed market record: {0}")]
    MalformedRecord(String),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Transport(_) => ErrorKind::Transport,
            IngestError::Lookup(_) => ErrorKind::Lookup,
            IngestError::Parse { .. } => ErrorKind::Parse,
            IngestError::Persistence { .. } => ErrorKind::Persistence,
            IngestError::MalformedRecord(_) => ErrorKind::Malformed,
        }
    }
}
