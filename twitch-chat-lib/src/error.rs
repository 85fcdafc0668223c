use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint answered with a non-success status.
    #[error("Error during request: HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// A caller broke a contract, e.g. a page fetch with neither offset nor cursor.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The body parsed but lacks the fields we need, or carries GraphQL errors.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Concurrency limiter closed")]
    LimiterClosed,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
