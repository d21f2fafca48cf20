//! Error handling for bytebuf

use std::io;
use thiserror::Error;

/// The main error type for buffer and I/O operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("System error: {0}")]
    System(#[from] io::Error),
    #[error("Invalid argument: {0}")]
    Argument(String),
    #[error("Limit exceeded: {0}")]
    Limit(String),
    #[error("Unexpected end of data")]
    Eof,
}

impl Error {
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        Error::Argument(msg.into())
    }
    pub fn limit<S: Into<String>>(msg: S) -> Self {
        Error::Limit(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_argument() {
        let e = Error::argument("bad offset");
        assert!(matches!(e, Error::Argument(_)));
        assert!(format!("{}", e).contains("bad offset"));
    }

    #[test]
    fn test_error_limit() {
        let e = Error::limit("too large");
        assert!(matches!(e, Error::Limit(_)));
        assert!(format!("{}", e).contains("too large"));
    }

    #[test]
    fn test_error_eof() {
        let e = Error::Eof;
        assert!(format!("{}", e).contains("end of data"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::System(_)));
        assert!(format!("{}", e).contains("file not found"));
    }
}
