//! Error types for the realtime event stream.
//!
//! Follows the same pattern as the payload crates: a root `Error` struct holding
//! an error kind and an optional source for error chaining. These errors are
//! what `TIMEOUT` and `STREAM_ERROR` listeners receive.

use std::error::Error as StdError;
use std::fmt;

/// Top-level stream error.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: StreamErrorKind,
}

/// Categories of failure on the realtime stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamErrorKind {
    /// The endpoint answered with a non-success status.
    Connection { status: u16 },
    /// A connect or read deadline elapsed.
    Timeout(TimeoutPhase),
    /// Network or body read failure.
    Transport,
    /// A frame or payload could not be decoded.
    Decode,
    /// Missing or invalid configuration, e.g. session cookies.
    Config,
}

/// Where a timeout happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutPhase {
    Connect,
    Idle,
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self.error_kind, StreamErrorKind::Timeout(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            StreamErrorKind::Connection { status } => {
                write!(f, "Failed to connect. Status {status}.")
            }
            StreamErrorKind::Timeout(TimeoutPhase::Connect) => {
                write!(f, "Timed out connecting to the event stream")
            }
            StreamErrorKind::Timeout(TimeoutPhase::Idle) => {
                write!(f, "Event stream idle timeout elapsed")
            }
            StreamErrorKind::Transport => write!(f, "Event stream transport error"),
            StreamErrorKind::Decode => write!(f, "Failed to decode event stream frame"),
            StreamErrorKind::Config => write!(f, "Event stream configuration error"),
        }?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
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
        Error {
            source: Some(Box::new(err)),
            error_kind: StreamErrorKind::Decode,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let error_kind = if err.kind() == std::io::ErrorKind::TimedOut {
            StreamErrorKind::Timeout(TimeoutPhase::Idle)
        } else {
            StreamErrorKind::Transport
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create a connection error for a non-success status.
pub fn connection_error(status: u16) -> Error {
    Error {
        source: None,
        error_kind: StreamErrorKind::Connection { status },
    }
}

/// Helper function to create a timeout error.
pub fn timeout_error(phase: TimeoutPhase) -> Error {
    Error {
        source: None,
        error_kind: StreamErrorKind::Timeout(phase),
    }
}

/// Helper function to wrap a transport failure.
pub fn transport_error(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Error {
    Error {
        source: Some(source.into()),
        error_kind: StreamErrorKind::Transport,
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: StreamErrorKind::Config,
    }
}
