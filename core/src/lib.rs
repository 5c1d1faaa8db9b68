//! A crate to run a scripted APDU exchange against a smartcard through a subsystem delegate.

#[cfg(feature = "pcsc")]
pub mod pcsc;

pub mod apdu;
pub mod error;
pub mod report;
pub mod script;
pub mod session;
pub mod subsystem;

#[cfg(test)]
mod mock;

pub use error::{Error, ErrorKind, Result};
pub use script::Script;
pub use session::Session;
