//! Error types for the `messenger` crate.
//!
//! Follows the same layered pattern as the rest of the platform: a root `Error`
//! struct holding an `error_kind` and an optional `source` for error chaining.
//! The `web` layer translates the kinds into HTTP status codes.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use std::error::Error as StdError;
use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Boxed error produced by an underlying duplex transport.
pub type TransportError = Box<dyn StdError + Send + Sync>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Kinds of errors surfaced by the guest messenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The inbound request could not be turned into a duplex connection.
    Upgrade,
    /// No live connection is registered for the guest.
    NoSuchConnection,
    /// The guest's connection died after the lookup succeeded and before a
    /// result was produced. Deregistration is in flight.
    ConnectionClosed,
    /// A write did not complete within the write deadline.
    WriteTimeout,
    /// The transport reported a failure while writing.
    Transport,
    /// The message content could not be serialized to the wire format.
    Serialization,
    /// The messenger has been shut down and accepts no new connections.
    ShutDown,
    /// Invalid connection settings.
    Config,
}

impl Error {
    pub fn new(error_kind: ErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }

    pub fn with_source(
        error_kind: ErrorKind,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            error_kind,
        }
    }

    pub fn no_such_connection() -> Self {
        Self::new(ErrorKind::NoSuchConnection)
    }

    pub fn connection_closed() -> Self {
        Self::new(ErrorKind::ConnectionClosed)
    }

    pub fn transport(source: TransportError) -> Self {
        Self {
            source: Some(source),
            error_kind: ErrorKind::Transport,
        }
    }

    /// Whether this error means the connection can no longer be written to.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::WriteTimeout | ErrorKind::Transport
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let description = match self {
            ErrorKind::Upgrade => "connection upgrade failed",
            ErrorKind::NoSuchConnection => "no such connection",
            ErrorKind::ConnectionClosed => "connection closed",
            ErrorKind::WriteTimeout => "write deadline exceeded",
            ErrorKind::Transport => "transport failure",
            ErrorKind::Serialization => "message serialization failed",
            ErrorKind::ShutDown => "messenger is shut down",
            ErrorKind::Config => "invalid connection settings",
        };
        write!(f, "{description}")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Messenger Error: {}: {source}", self.error_kind),
            None => write!(f, "Messenger Error: {}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Serialization, err)
    }
}

impl From<WebSocketUpgradeRejection> for Error {
    fn from(err: WebSocketUpgradeRejection) -> Self {
        Error::with_source(ErrorKind::Upgrade, err)
    }
}
