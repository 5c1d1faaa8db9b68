//! Delegates to communicate with the smartcard subsystem outside.
//!
//! The session runner only talks to these traits, so any middleware (PC/SC through the `pcsc`
//! feature, or a scripted one in tests) can sit behind them. All calls are blocking.

use std::fmt::{Display, Formatter};
use std::ops::BitOr;

use crate::error::{Error, ErrorKind, Result};

/// Capacity of the buffer that receives each response.
pub const RESPONSE_CAPACITY: usize = 256;

/// A response buffer, freshly zeroed for every transmission.
pub type ResponseBuffer = [u8; RESPONSE_CAPACITY];

/// Scope of the subsystem context.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Scope {
    User,
    Terminal,
    #[default]
    System,
}

/// A transport protocol the subsystem may negotiate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Protocol {
    T0,
    T1,
    Raw,
}

/// A set of protocols offered on connect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Protocols(u8);

impl Protocols {
    pub const T0: Self = Self(0b001);
    pub const T1: Self = Self(0b010);

    /// RAW is never offered, so it is never contained.
    pub fn contains(self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::T0 => self.0 & Self::T0.0 != 0,
            Protocol::T1 => self.0 & Self::T1.0 != 0,
            Protocol::Raw => false,
        }
    }
}

impl BitOr for Protocols {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Protocol-specific parameters handed to each transmission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SendPci {
    T0,
    T1,
}

impl SendPci {
    /// Maps the negotiated protocol to its send parameters.
    /// Only T0 and T1 are supported; anything else, including no protocol at all, is a mismatch.
    pub fn resolve(protocol: Option<Protocol>) -> Result<Self> {
        match protocol {
            Some(Protocol::T0) => Ok(Self::T0),
            Some(Protocol::T1) => Ok(Self::T1),
            other => Err(Error::new(
                ErrorKind::ProtocolMismatch,
                format!("Protocol not supported: {}", DisplayProtocol(other)),
            )),
        }
    }

    pub fn protocol(self) -> Protocol {
        match self {
            Self::T0 => Protocol::T0,
            Self::T1 => Protocol::T1,
        }
    }
}

struct DisplayProtocol(Option<Protocol>);

impl Display for DisplayProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(Protocol::T0) => f.write_str("T0"),
            Some(Protocol::T1) => f.write_str("T1"),
            Some(Protocol::Raw) => f.write_str("Raw"),
            None => f.write_str("Unset"),
        }
    }
}

/// A resource that must be given back to the subsystem.
pub trait Release {
    fn release(self) -> Result<()>;
}

/// Entry point to the smartcard subsystem.
pub trait Subsystem {
    type Context: Context;

    /// Establishes a context in the scope.
    fn establish(&self, scope: Scope) -> Result<Self::Context>;
}

/// An established context. Releasing it ends the session with the subsystem.
pub trait Context: Release {
    type Card: Card;

    /// A reader as the subsystem names it. Displayed only for reports and logs.
    type Reader: Display;

    /// Lists the attached readers, in the order the subsystem reports them.
    fn list_readers(&self) -> Result<Vec<Self::Reader>>;

    /// Connects to the card in the reader in shared mode.
    /// The subsystem picks one of the offered protocols.
    fn connect(&self, reader: &Self::Reader, protocols: Protocols) -> Result<Self::Card>;
}

/// A connected card. Releasing it disconnects, leaving the card as is.
pub trait Card: Release {
    /// Returns the protocol negotiated on connect, if any.
    /// Queried once per run, before the first transmission.
    fn active_protocol(&self) -> Result<Option<Protocol>>;

    /// Transmits an APDU command to the card, then receives a response from them into `rx`.
    /// Returns how many octets were received.
    fn transmit(&self, pci: SendPci, tx: &[u8], rx: &mut ResponseBuffer) -> Result<usize>;
}
