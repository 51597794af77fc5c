//! Raw result of a single network call attempt, before normalization.
//!
//! A [`CallOutcome`] is built once per attempt by the API layer and handed
//! straight to the classifier; it is never stored.

/// Non-2xx response: status code plus the (truncated) raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub status: u16,
    pub message: String,
}

/// What went wrong below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    ConnectivityLoss,
    Unknown(String),
}

impl TransportKind {
    /// Bucket a `reqwest` transport error into the three kinds we care about.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::ConnectivityLoss
        } else {
            TransportKind::Unknown(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<T> {
    Success(T),
    Http(HttpFailure),
    Transport(TransportKind),
}

impl<T> CallOutcome<T> {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        CallOutcome::Http(HttpFailure {
            status,
            message: message.into(),
        })
    }

    /// Map the success payload, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CallOutcome<U> {
        match self {
            CallOutcome::Success(payload) => CallOutcome::Success(f(payload)),
            CallOutcome::Http(failure) => CallOutcome::Http(failure),
            CallOutcome::Transport(kind) => CallOutcome::Transport(kind),
        }
    }
}
