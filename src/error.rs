//! Crate error type
//!
//! One error enum for every layer: configuration, source I/O, encoding,
//! well-formedness and internal state.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A composite was requested over no parts at all
    #[error("List of compound {what} is empty")]
    EmptyParts { what: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported encoding '{0}'")]
    UnsupportedEncoding(String),

    #[error("Invalid {encoding} content: {message}")]
    Decode {
        encoding: &'static str,
        message: String,
    },

    #[error("{message} (line {line}, column {column})")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// Internal invariant violation, never a recoverable condition
    #[error("Unexpected state: {0}")]
    InvalidState(String),
}

impl Error {
    /// Unwrap an I/O error that merely transports a crate error, such as the
    /// ones raised while translating a cursor back into bytes.
    pub fn from_io(err: io::Error) -> Self {
        if err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            if let Some(inner) = err.into_inner() {
                return match inner.downcast::<Error>() {
                    Ok(original) => *original,
                    Err(other) => Error::Io(io::Error::other(other)),
                };
            }
            return Error::InvalidState("I/O error lost its payload".into());
        }
        Error::Io(err)
    }

    /// Wrap into an I/O error, the inverse of [`Error::from_io`].
    pub fn into_io(self) -> io::Error {
        match self {
            Error::Io(err) => err,
            other => io::Error::other(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_round_trip_keeps_original() {
        let original = Error::Syntax {
            message: "bad".into(),
            line: 3,
            column: 7,
        };
        let restored = Error::from_io(original.into_io());
        assert!(matches!(restored, Error::Syntax { line: 3, column: 7, .. }));
    }

    #[test]
    fn test_plain_io_error_stays_io() {
        let err = Error::from_io(io::Error::new(io::ErrorKind::UnexpectedEof, "short"));
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_empty_parts_message() {
        let err = Error::EmptyParts { what: "streams" };
        assert_eq!(err.to_string(), "List of compound streams is empty");
    }
}
