//! Contains the error type used by `Server`

use crate::BoxError;

use derive_more::Display;
use std::net::AddrParseError;
use thiserror::Error;

/// Error returned by [`ServerBuilder::build`](crate::ServerBuilder::build) and the
/// [`Server.listen`](crate::Server::listen()) method
#[derive(Error, Debug)]
#[error("server error: {msg}")]
pub struct ServerError {
    msg: String,
    kind: ServerErrorKind,
    #[source]
    source: Option<BoxError>,
}

/// The categories of [`ServerError`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ServerErrorKind {
    /// The server was configured with an unusable option
    #[display("invalid configuration")]
    InvalidConfiguration,
    /// The listen address could not be parsed
    #[display("invalid address")]
    InvalidAddress,
    /// Binding or accepting on the control port failed
    #[display("io error")]
    Io,
}

impl ServerError {
    fn new<E: std::error::Error + Send + Sync + 'static>(kind: ServerErrorKind, msg: impl Into<String>, source: E) -> ServerError {
        ServerError {
            msg: msg.into(),
            kind,
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn invalid_configuration(msg: impl Into<String>) -> ServerError {
        ServerError {
            msg: msg.into(),
            kind: ServerErrorKind::InvalidConfiguration,
            source: None,
        }
    }

    /// Tells what went wrong
    pub fn kind(&self) -> ServerErrorKind {
        self.kind
    }
}

impl From<AddrParseError> for ServerError {
    fn from(e: AddrParseError) -> Self {
        ServerError::new(ServerErrorKind::InvalidAddress, "could not parse address", e)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::new(ServerErrorKind::Io, "io error", e)
    }
}
