// Copyright 2014-2015 Johannes Köster, Peer Aramillo Irizar.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Crate-wide error type.
//!
//! Every fallible operation in `uproc` returns [`Result<T>`], whose error
//! variant names the kinds of failure that can arise while indexing or
//! classifying sequences: invalid arguments, allocation failure, I/O,
//! malformed on-disk format, missing platform support, and lookups that
//! found nothing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// An argument failed validation (e.g. a malformed alphabet string).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A requested allocation could not be satisfied.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// On-disk data did not match the expected format (bad header, bad
    /// magic number, truncated file).
    #[error("format error in {path}: {message}")]
    Format {
        /// The file in which the malformed data was found.
        path: PathBuf,
        /// Human-readable description of what was wrong.
        message: String,
    },

    /// The requested operation is not supported in this build/environment
    /// (e.g. memory-mapping unavailable).
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A lookup failed to find a key it expected to find.
    #[error("not found: {0}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn format<S: Into<String>>(path: impl Into<PathBuf>, msg: S) -> Self {
        Error::Format {
            path: path.into(),
            message: msg.into(),
        }
    }
}
