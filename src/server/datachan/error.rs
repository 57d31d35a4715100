//! Contains the error type for establishing data connections.

use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The error returned when a data connection could not be set up.
#[derive(Debug, Error)]
#[error("data channel error: {kind}")]
pub struct DataChanError {
    kind: DataChanErrorKind,
    #[source]
    source: Option<BoxError>,
}

/// The reasons a data connection can't be set up.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum DataChanErrorKind {
    /// The `PORT` argument is not a valid `h1,h2,h3,h4,p1,p2` specification.
    #[display("Invalid host-port specification")]
    InvalidHostPort,
    /// The client did not accept the connection within the configured timeout.
    #[display("Timed out connecting to client")]
    ConnectTimeout,
    /// Connecting to the client failed, e.g. because nothing listens on the port.
    #[display("Could not connect to client")]
    ConnectFailed,
}

impl DataChanError {
    pub fn new<E>(kind: DataChanErrorKind, error: E) -> DataChanError
    where
        E: Into<BoxError>,
    {
        DataChanError {
            kind,
            source: Some(error.into()),
        }
    }

    pub fn kind(&self) -> DataChanErrorKind {
        self.kind
    }
}

impl From<DataChanErrorKind> for DataChanError {
    fn from(kind: DataChanErrorKind) -> DataChanError {
        DataChanError { kind, source: None }
    }
}
