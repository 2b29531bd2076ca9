//! Writer error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for writer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing or driving the rolling file writer
///
/// Configuration problems surface at construction time; I/O failures surface
/// synchronously from the operation that hit them. Nothing is swallowed - a
/// failed write is always visible to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Unsupported charset name in configuration
    #[error("unknown charset '{0}'")]
    UnknownCharset(String),

    /// Malformed path template in configuration
    #[error("invalid path template: {0}")]
    InvalidPathTemplate(String),

    /// Malformed policy parameters in configuration
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// Write buffer too small to hold a charset header
    #[error("buffer size of {0} bytes is too small")]
    InvalidBufferSize(usize),

    /// Failed to create or open a log file
    #[error("failed to open log file '{path}': {source}")]
    Open {
        /// Path of the log file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to write encoded bytes to a log file
    #[error("failed to write to log file '{path}': {source}")]
    Write {
        /// Path of the log file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to flush buffered bytes to a log file
    #[error("failed to flush log file '{path}': {source}")]
    Flush {
        /// Path of the log file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}
