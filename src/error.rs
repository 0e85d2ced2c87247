use thiserror::Error;

#[derive(Debug, Error)]
pub enum SquadronError {
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("rate limited by endpoint")]
    RateLimited,

    #[error("auth failed: {0}")]
    AuthFailed(String),

    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no results to analyze")]
    EmptyResults,

    #[error("persist error: {0}")]
    Persist(#[from] std::io::Error),
}

impl SquadronError {
    /// Returns true for transient errors that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Upstream { status, .. } => {
                // 5xx = server error (retryable), 4xx = client error (not retryable)
                // status: None = ambiguous (not from HTTP) → safe default: NOT retryable
                status.is_some_and(|s| s >= 500)
            }
            Self::Request(_) => true, // connection errors may be transient
            _ => false,
        }
    }
}
