use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,
    #[error("malformed `{event}` event: {reason}")]
    MalformedEvent { event: String, reason: String },
}

/// Trims the raw input and rejects blank queries.
pub fn validate_query(raw: &str) -> Result<&str, SearchError> {
    let query = raw.trim();
    if query.is_empty() {
        Err(SearchError::EmptyQuery)
    } else {
        Ok(query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    ConnectTimeout,
    UnsupportedContentType,
    Network,
    ClosedBeforeDone,
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailureKind::InvalidUrl => write!(f, "invalid url"),
            TransportFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            TransportFailureKind::ConnectTimeout => write!(f, "connection timed out"),
            TransportFailureKind::UnsupportedContentType => write!(f, "not an event stream"),
            TransportFailureKind::Network => write!(f, "network error"),
            TransportFailureKind::ClosedBeforeDone => write!(f, "stream closed before done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct TransportFailure {
    pub kind: TransportFailureKind,
    pub message: String,
}

impl TransportFailure {
    pub fn new(kind: TransportFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
