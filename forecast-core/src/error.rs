use thiserror::Error;

/// Failure of a single forecast fetch. Every variant is terminal for that
/// invocation; nothing is retried.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request URL could not be built from the base endpoint and location.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network-layer failure, a timeout, or a non-success HTTP status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The body was received but does not satisfy the forecast schema.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Message-free discriminant of [`ForecastError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastErrorKind {
    InvalidRequest,
    Transport,
    Decode,
}

impl ForecastError {
    pub fn kind(&self) -> ForecastErrorKind {
        match self {
            ForecastError::InvalidRequest(_) => ForecastErrorKind::InvalidRequest,
            ForecastError::Transport(_) => ForecastErrorKind::Transport,
            ForecastError::Decode(_) => ForecastErrorKind::Decode,
        }
    }
}

impl ForecastErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastErrorKind::InvalidRequest => "invalid-request",
            ForecastErrorKind::Transport => "transport",
            ForecastErrorKind::Decode => "decode",
        }
    }
}

impl std::fmt::Display for ForecastErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
