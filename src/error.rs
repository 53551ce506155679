use mongodb::error::ErrorKind;
use reqwest::StatusCode;
use thiserror::Error;

/// Failures of the three downstream services.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("Request failed with status code {status}: {body}")]
    EmbeddingRequestFailed { status: u16, body: String },

    #[error("embedding request failed")]
    EmbeddingTransport(#[source] reqwest::Error),

    #[error("vector search failed")]
    Search(#[from] mongodb::error::Error),

    #[error("matched document has no \"text\" field")]
    MissingText,

    #[error("completion request failed: {cause}")]
    CompletionRequestFailed { status: Option<u16>, cause: String },
}

impl RagError {
    /// Whether a second attempt could succeed. Nothing retries today; every
    /// error still terminates the run.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::EmbeddingRequestFailed { status, .. } => retryable_status(*status),
            Self::EmbeddingTransport(e) => e.is_timeout() || e.is_connect(),
            Self::Search(e) => matches!(
                *e.kind,
                ErrorKind::Io(_) | ErrorKind::ServerSelection { .. }
            ),
            Self::MissingText => false,
            Self::CompletionRequestFailed { status, .. } => status.map_or(true, retryable_status),
        }
    }
}

fn retryable_status(status: u16) -> bool {
    StatusCode::from_u16(status)
        .is_ok_and(|s| s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error())
}
