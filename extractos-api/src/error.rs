use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the statements provider. All of them abort a run.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing configuration; define in .env: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("{endpoint} request failed: {source}")]
    Http {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{endpoint} response has no `{field}` field")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },

    #[error("unexpected statements payload: {0}")]
    UnexpectedPayload(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ApiError>;
