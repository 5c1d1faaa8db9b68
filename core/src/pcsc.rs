//! PC/SC backend for the session runner.
//! Can be enabled by turning `pcsc` feature on.
//!
//! ## What is PC/SC?
//! PC/SC (Personal Computer/Smart Card) is an abstraction layer for communicating with Smart Cards
//! from Windows. Using this layer, applications can connect to any devices that supports PC/SC,
//! without depending on their driver implementation. Windows and macOS supports PC/SC by themselves,
//! Linux also supports by installing pcsc-lite shared library.
//!
//! ## Supported platform
//! Linux, Windows and macOS are supported by pcsc-rust, backend of this implementation.
//! Refer the documentation of pcsc-rust for details:
//! <https://github.com/bluetech/pcsc-rust>
//!
//! ## Usage
//! ```rust,no_run
//! use scardrun::pcsc::PcscSubsystem;
//! use scardrun::session::{run_and_report, Session};
//!
//! let session = Session::new(PcscSubsystem);
//! run_and_report(&session, &mut std::io::stdout().lock()).unwrap();
//! ```

use std::cell::Cell;
use std::ffi::CString;
use std::fmt::{Display, Formatter};

use pcsc::Disposition;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::subsystem::{
    Card, Context, Protocol, Protocols, Release, ResponseBuffer, Scope, SendPci, Subsystem,
};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {};
}

impl From<pcsc::Error> for ErrorKind {
    fn from(e: pcsc::Error) -> Self {
        use pcsc::Error::*;

        match e {
            NoService | ServiceStopped => ErrorKind::SubsystemUnavailable,
            NoReadersAvailable => ErrorKind::NoReadersAvailable,
            ProtoMismatch => ErrorKind::ProtocolMismatch,
            NoSmartcard => ErrorKind::NoSmartcard,
            RemovedCard => ErrorKind::RemovedCard,
            ResetCard => ErrorKind::ResetCard,
            UnpoweredCard => ErrorKind::UnpoweredCard,
            UnresponsiveCard => ErrorKind::UnresponsiveCard,
            UnsupportedCard | CardUnsupported => ErrorKind::UnsupportedCard,
            SharingViolation => ErrorKind::SharingViolation,
            NoAccess => ErrorKind::NoAccess,
            ReaderUnavailable => ErrorKind::ReaderUnavailable,
            UnknownReader => ErrorKind::UnknownReader,
            InsufficientBuffer => ErrorKind::InsufficientBuffer,
            InvalidParameter => ErrorKind::InvalidParameter,
            InvalidValue => ErrorKind::InvalidValue,
            InvalidHandle => ErrorKind::InvalidHandle,
            CommError => ErrorKind::CommError,
            Timeout => ErrorKind::Timeout,
            Cancelled => ErrorKind::Cancelled,
            UnsupportedFeature => ErrorKind::UnsupportedFeature,
            InternalError => ErrorKind::InternalError,
            NoMemory => ErrorKind::NoMemory,
            _ => ErrorKind::Unknown,
        }
    }
}

impl From<pcsc::Error> for Error {
    fn from(e: pcsc::Error) -> Self {
        Error::new(e.into(), e)
    }
}

fn scope(scope: Scope) -> pcsc::Scope {
    match scope {
        Scope::User => pcsc::Scope::User,
        Scope::Terminal => pcsc::Scope::Terminal,
        Scope::System => pcsc::Scope::System,
    }
}

fn protocols(offered: Protocols) -> pcsc::Protocols {
    let mut protocols = pcsc::Protocols::empty();
    if offered.contains(Protocol::T0) {
        protocols |= pcsc::Protocols::T0;
    }
    if offered.contains(Protocol::T1) {
        protocols |= pcsc::Protocols::T1;
    }

    protocols
}

fn protocol(protocol: pcsc::Protocol) -> Protocol {
    #[allow(unreachable_patterns)]
    match protocol {
        pcsc::Protocol::T0 => Protocol::T0,
        pcsc::Protocol::T1 => Protocol::T1,
        _ => Protocol::Raw,
    }
}

/// The PC/SC service of this machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcscSubsystem;

impl Subsystem for PcscSubsystem {
    type Context = PcscContext;

    fn establish(&self, s: Scope) -> Result<PcscContext> {
        let ctx = pcsc::Context::establish(scope(s))?;
        debug!("Established a PC/SC context in {:?} scope", s);

        Ok(PcscContext { ctx })
    }
}

/// PC/SC context.
pub struct PcscContext {
    ctx: pcsc::Context,
}

impl Release for PcscContext {
    fn release(self) -> Result<()> {
        self.ctx.release().map_err(|(_, e)| e.into())
    }
}

/// A reader name exactly as PC/SC reports it.
/// Names that are not valid UTF-8 are displayed lossily but connected to unchanged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReaderName(CString);

impl Display for ReaderName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_string_lossy())
    }
}

impl Context for PcscContext {
    type Card = PcscCard;
    type Reader = ReaderName;

    fn list_readers(&self) -> Result<Vec<ReaderName>> {
        match self.ctx.list_readers_owned() {
            Ok(readers) => Ok(readers.into_iter().map(ReaderName).collect()),
            Err(pcsc::Error::NoReadersAvailable) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn connect(&self, reader: &ReaderName, offered: Protocols) -> Result<PcscCard> {
        let card = self
            .ctx
            .connect(&reader.0, pcsc::ShareMode::Shared, protocols(offered))?;
        debug!("Connected to the card in {}", reader);

        Ok(PcscCard {
            card,
            active: Cell::new(None),
        })
    }
}

/// A card to be communicated through PC/SC.
/// Owned by the session from the moment it is connected, so every later failure disconnects it
/// with [`Disposition::LeaveCard`].
pub struct PcscCard {
    card: pcsc::Card,
    active: Cell<Option<Protocol>>,
}

impl Release for PcscCard {
    fn release(self) -> Result<()> {
        self.card
            .disconnect(Disposition::LeaveCard)
            .map_err(|(_, e)| e.into())
    }
}

impl Card for PcscCard {
    fn active_protocol(&self) -> Result<Option<Protocol>> {
        let active = self.card.status2_owned()?.protocol2().map(protocol);
        debug!("Active protocol: {:?}", active);

        self.active.set(active);
        Ok(active)
    }

    /// Transmits an APDU command to the card, then receives a response from them.
    /// PC/SC picks the PCI structure from the connection itself, so `pci` has to agree with it.
    fn transmit(&self, pci: SendPci, tx: &[u8], rx: &mut ResponseBuffer) -> Result<usize> {
        if self.active.get() != Some(pci.protocol()) {
            return Err(Error::new(
                ErrorKind::ProtocolMismatch,
                format!("Card is not connected using {:?}", pci.protocol()),
            ));
        }

        debug!("TX: {}", hex::encode(tx));

        let received = self.card.transmit(tx, rx)?;

        debug!("RX: {}", hex::encode(received));

        Ok(received.len())
    }
}
