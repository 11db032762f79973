// Failure taxonomy for statistics fetches.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, timeout, or body-read failure. The only retryable kind.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    /// Short text for the visible error block. Never includes the body.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Transport { .. } => {
                "Statistics are unavailable right now. Check your connection and try again."
                    .to_string()
            }
            FetchError::Status { status: 404, .. } => {
                "No statistics found for this selection.".to_string()
            }
            FetchError::Status { status, .. } => {
                format!("The statistics service returned an error ({status}).")
            }
            FetchError::Decode { .. } => {
                "The statistics service sent an unreadable response.".to_string()
            }
        }
    }
}
