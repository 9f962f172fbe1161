//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by trainware's fallible operations.
///
/// Composing a [`Train`](crate::Train) never fails, and application-level
/// errors (401, 404, etc.) are [`Response`](crate::Response) values. This
/// type surfaces hosting failures: a bad bind address, binding to a port,
/// or accepting a connection.
#[derive(Debug)]
pub enum Error {
    /// The address given to [`Server::bind`](crate::Server::bind) is not `host:port`.
    InvalidAddr(String, AddrParseError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAddr(addr, e) => write!(f, "invalid socket address `{addr}`: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidAddr(_, e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
