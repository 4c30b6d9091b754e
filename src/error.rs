//! Error types for TOML encoding.
//!
//! The taxonomy is small and structural:
//!
//! - [`Error::Cycle`]: the value tree contains a container reachable from
//!   itself. Nothing is written; a failed render never returns partial text.
//! - [`Error::InvalidSeparator`]: an array-separator variant was constructed
//!   with a separator that is not a comma plus optional whitespace.
//! - [`Error::InvalidDestination`]: a malformed destination argument, e.g. a
//!   byte path that is not valid UTF-8.
//! - [`Error::Io`]: the terminal write to a file or stream failed.
//!
//! Formatter exhaustion is deliberately *not* an error: a value no formatter
//! recognizes falls through to string formatting instead of aborting.

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding TOML.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The value tree contains a cyclic container graph.
    #[error("circular reference detected")]
    Cycle,

    /// Invalid separator string for the array-separator variant.
    #[error("invalid separator for arrays: {0:?}")]
    InvalidSeparator(String),

    /// Malformed destination argument passed to [`dump`](crate::dump).
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// IO error during the terminal write.
    #[error("IO error: {0}")]
    Io(String),

    /// Generic message.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Creates an error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use toml_emit::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }

    /// Creates an I/O error for file or stream write failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
