//! Error types for the poll API client.
//!
//! # Design
//! `NotFound` and `Conflict` get dedicated variants because callers show
//! specific messages for them ("poll does not exist", "already voted").
//! All other non-2xx responses land in `Remote` with the status code and the
//! server's message. Connection-level failures stay in `TransportError` so
//! the retry layer can tell them apart from received responses.

use thiserror::Error;

/// Failures raised before any HTTP response was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// The request could not be sent at all (bad URL, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Whether the failure happened before the server could have seen the
    /// request, making another attempt worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connect(_) | TransportError::Timeout(_) | TransportError::Io(_)
        )
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        let message = err.to_string();
        match err {
            ureq::Error::Timeout(_) => TransportError::Timeout(message),
            ureq::Error::ConnectionFailed | ureq::Error::HostNotFound => {
                TransportError::Connect(message)
            }
            ureq::Error::Io(_) => TransportError::Io(message),
            _ => TransportError::InvalidRequest(message),
        }
    }
}

/// Local precondition failures, plus server-side rejections of a new poll.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be blank")]
    BlankTitle,

    #[error("at least two non-blank options are required (found {found})")]
    TooFewOptions { found: usize },

    #[error("duration must be a positive number of hours")]
    NonPositiveDuration,

    #[error("participant name must not be blank")]
    BlankParticipant,

    #[error("poll id must not be blank")]
    BlankPollId,

    #[error("rejected by server: {0}")]
    Rejected(String),
}

/// Errors returned by `PollApi`, `PollClient` parse methods and repositories.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server returned 404; the requested poll does not exist.
    #[error("poll not found")]
    NotFound,

    /// The server returned 409 on a vote; the participant already voted.
    #[error("participant already voted on this poll: {message}")]
    Conflict { message: String },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The response body could not be deserialized into the expected type.
    #[error("response decoding failed: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("request encoding failed: {0}")]
    Encode(String),
}

impl ApiError {
    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Conflict { .. } => Some(409),
            ApiError::Remote { status, .. } => Some(*status),
            ApiError::Validation(ValidationError::Rejected(_)) => Some(400),
            _ => None,
        }
    }
}
