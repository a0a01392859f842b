use serde::Deserialize;
use std::{
    fmt::{Debug, Display},
    time::Duration,
};

pub type Result<T, E = Error> = ::core::result::Result<T, E>;

// An error of the `falbench` library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no credential available: pass an API key or set FAL_KEY")]
    MissingCredential,
    #[error("Failed to generate image (took {:.2}s): {cause}", .elapsed.as_secs_f64())]
    Generation { elapsed: Duration, cause: Box<Error> },
    #[error("fal error: {0}")]
    Fal(#[from] FalError),
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    #[inline]
    pub fn msg<M: Display + Debug + Send + Sync + 'static>(msg: M) -> Self {
        Self::Other(anyhow::Error::msg(msg))
    }

    /// Wraps `self` as the cause of a failed generation that ran for `elapsed`.
    #[inline]
    pub fn generation(self, elapsed: Duration) -> Self {
        Self::Generation {
            elapsed,
            cause: Box::new(self),
        }
    }
}

/// Error body returned by a fal endpoint
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct FalError {
    /// Either a plain message or a list of validation errors
    pub detail: serde_json::Value,
    #[serde(skip)]
    pub status: Option<u16>,
}

impl FalError {
    #[inline]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl Display for FalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(status) = self.status {
            write!(f, "[{status}] ")?;
        }

        match &self.detail {
            serde_json::Value::String(msg) => Display::fmt(msg, f),
            other => Display::fmt(other, f),
        }
    }
}

impl std::error::Error for FalError {}
