use thiserror::Error;

/// Errors surfaced by the API client and the job monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("unauthorized - check the API token")]
    Unauthorized,

    #[error("server rejected the request: {0}")]
    Api(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid job handle: {0}")]
    InvalidHandle(String),

    #[error(transparent)]
    Model(#[from] fretwire_model::ModelError),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
