//! The single error channel of a run.

use std::fmt::Display;

/// Symbolic kind of a failure.
/// The `Debug` name is what gets printed in the diagnostic line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The smartcard service could not be reached.
    SubsystemUnavailable,
    /// No reader is attached to the system.
    NoReadersAvailable,
    /// The negotiated protocol is neither T0 nor T1.
    ProtocolMismatch,

    NoSmartcard,
    RemovedCard,
    ResetCard,
    UnpoweredCard,
    UnresponsiveCard,
    UnsupportedCard,
    SharingViolation,
    NoAccess,
    ReaderUnavailable,
    UnknownReader,
    InsufficientBuffer,
    InvalidParameter,
    InvalidValue,
    InvalidHandle,
    CommError,
    Timeout,
    Cancelled,
    UnsupportedFeature,
    InternalError,
    NoMemory,
    Unknown,

    /// The report could not be written to the console.
    Output,
}

/// A failure raised by any step of a run, carrying its kind and a readable message.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Display) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Output, e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
