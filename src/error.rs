//! Error types for the inbox core.

/// Failure talking to the remote email API.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
}

/// Errors surfaced through the store's error slot.
///
/// Cancellation of a superseded request is not an error and has no variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to fetch emails")]
    FetchListFailed(String),

    #[error("Failed to fetch email body")]
    FetchBodyFailed(String),

    /// The body arrived but its summary is not in the loaded list.
    #[error("Email not found")]
    BodyNotFoundLocally(String),
}

impl StoreError {
    /// Underlying cause, for logs.
    pub fn detail(&self) -> &str {
        match self {
            StoreError::FetchListFailed(d)
            | StoreError::FetchBodyFailed(d)
            | StoreError::BodyNotFoundLocally(d) => d,
        }
    }
}
