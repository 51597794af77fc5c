use thiserror::Error;

/// Normalized, application-level error returned to non-network layers.
///
/// Every failed network call ends up as exactly one of these variants; the
/// caller decides whether to retry, surface it, or fall back to cached data.
/// User-facing wording lives in the presentation layer, not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("city '{0}' was not found")]
    CityNotFound(String),

    #[error("no internet connection")]
    NoInternet,

    #[error("server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}
