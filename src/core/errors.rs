use std::error::Error as StdError;
use std::fmt;

/// Failures reported by a chat or assistant store.
#[derive(Debug)]
pub enum StoreError {
    /// The request never produced a response.
    Http(reqwest::Error),
    /// The backend answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body did not match the expected shape.
    Decode(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Http(err) => write!(f, "Store request failed: {err}"),
            StoreError::Status { status, body } => {
                write!(f, "Store request returned {status}: {}", body.trim())
            }
            StoreError::Decode(message) => write!(f, "Unexpected store response: {message}"),
        }
    }
}

impl StdError for StoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StoreError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Http(err)
        }
    }
}

/// Failures starting a run stream. Failures after the stream is open arrive as
/// stream events instead.
#[derive(Debug)]
pub enum StreamError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Http(err) => write!(f, "Failed to open run stream: {err}"),
            StreamError::Status { status, body } => {
                write!(f, "Run stream rejected with {status}: {}", body.trim())
            }
        }
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StreamError::Http(err) => Some(err),
            StreamError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Http(err)
    }
}

/// Error surfaced by orchestration operations. Store and stream failures pass
/// through untouched; missing context is never an error.
#[derive(Debug)]
pub enum TurnError {
    Store(StoreError),
    Stream(StreamError),
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::Store(err) => err.fmt(f),
            TurnError::Stream(err) => err.fmt(f),
        }
    }
}

impl StdError for TurnError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TurnError::Store(err) => Some(err),
            TurnError::Stream(err) => Some(err),
        }
    }
}

impl From<StoreError> for TurnError {
    fn from(err: StoreError) -> Self {
        TurnError::Store(err)
    }
}

impl From<StreamError> for TurnError {
    fn from(err: StreamError) -> Self {
        TurnError::Stream(err)
    }
}
