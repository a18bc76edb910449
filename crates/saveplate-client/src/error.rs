use std::path::PathBuf;

use saveplate_core::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend refused the bearer token.
    #[error("session expired, please log in again")]
    Unauthorized,

    /// Non-2xx answer. `message` is the server's own text when it sent one.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Server error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not logged in")]
    MissingToken,

    /// A notification action lacks the references it needs.
    #[error("{0}")]
    Incomplete(&'static str),

    #[error("invalid API URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Whether the session should be dropped in response to this error.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
