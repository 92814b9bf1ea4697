use thiserror::Error;

/// Why a fetch did not produce a usable payload.
///
/// An empty but well-formed payload is not an error; callers see it as an
/// empty value (for example [`HashtagPage::is_empty`](super::HashtagPage::is_empty)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response: refused connection, DNS
    /// failure, timeout, or a body that could not be read.
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The backend answered with a non-success HTTP status.
    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body was not the JSON shape this endpoint is expected to return.
    #[error("unexpected payload from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// Coarse failure class used for logging and the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Malformed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Malformed => write!(f, "malformed"),
        }
    }
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. } | Self::Status { .. } => FailureKind::Transport,
            Self::Malformed { .. } => FailureKind::Malformed,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Malformed { endpoint, .. } => endpoint,
        }
    }
}
