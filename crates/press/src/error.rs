use std::io;
use thiserror::Error;

/// Errors raised on the response write path.
///
/// Downstream stage failures and compression engine failures both surface as
/// [`SendError::Io`]; lifecycle misuse (writing before a stage is attached,
/// writing after `end`) surfaces as [`SendError::InvalidState`].
#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid filter state: {reason}")]
    InvalidState { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_state<S: ToString>(str: S) -> Self {
        Self::InvalidState { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
