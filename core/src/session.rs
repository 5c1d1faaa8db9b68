//! Runs a script against the first reader's card, reporting every response.
//!
//! ## Usage
//! ```rust,ignore
//! use scardrun::pcsc::PcscSubsystem;
//! use scardrun::{Script, Session};
//!
//! let session = Session::new(PcscSubsystem).with_script(Script::personal());
//! scardrun::session::run_and_report(&session, &mut std::io::stdout().lock()).unwrap();
//! ```

use std::io::Write;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::report;
use crate::script::Script;
use crate::subsystem::{
    Card, Context, Protocols, Release, ResponseBuffer, Scope, SendPci, Subsystem,
    RESPONSE_CAPACITY,
};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($t: tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($t: tt)*) => {};
}

/// Runs `f` with the resource, then gives the resource back to the subsystem on every path.
/// A release failure is returned only when `f` succeeded; otherwise it is logged and the failure
/// of `f` is returned.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn scoped<T, R>(name: &'static str, resource: T, f: impl FnOnce(&T) -> Result<R>) -> Result<R>
where
    T: Release,
{
    let result = f(&resource);
    let released = resource.release();

    match (result, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => {
            debug!("Released {} on early exit", name);
            Err(e)
        }
        (Err(e), Err(_release)) => {
            warn!("Could not release {}: {}", name, _release);
            Err(e)
        }
    }
}

/// A single scripted interaction with a card.
pub struct Session<S: Subsystem> {
    subsystem: S,
    scope: Scope,
    script: Script,
}

impl<S: Subsystem> Session<S> {
    /// Creates a session running the personal-data script in system scope.
    pub fn new(subsystem: S) -> Self {
        Self {
            subsystem,
            scope: Scope::System,
            script: Script::default(),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    /// Runs the script once, writing the report to `out`.
    /// The first failure aborts the run; nothing after it is transmitted.
    pub fn run(&self, out: &mut impl Write) -> Result<()> {
        let context = self.subsystem.establish(self.scope)?;

        scoped("context", context, |context| {
            let readers = context.list_readers()?;
            let reader = readers.first().ok_or_else(|| {
                Error::new(
                    ErrorKind::NoReadersAvailable,
                    "Could not find any Smartcard reader.",
                )
            })?;

            report::reader_name(out, reader)?;
            debug!("Using reader: {}", reader);

            let card = context.connect(reader, Protocols::T0 | Protocols::T1)?;

            scoped("card", card, |card| self.exchange(card, out))
        })
    }

    fn exchange(&self, card: &impl Card, out: &mut impl Write) -> Result<()> {
        let pci = SendPci::resolve(card.active_protocol()?)?;
        info!("Connected to the card using {:?}", pci.protocol());

        let steps = self.script.steps();
        for (i, step) in steps.iter().enumerate() {
            let tx = step.command.to_bytes();
            let mut rx: ResponseBuffer = [0u8; RESPONSE_CAPACITY];

            debug!("Sending {}", step.label);
            let _len = card.transmit(pci, &tx, &mut rx)?;
            debug!("Received {} octets for {}", _len, step.label);

            report::response(out, &rx)?;
            if i + 1 == steps.len() {
                report::text(out, &rx)?;
            }
        }

        Ok(())
    }
}

/// Runs the session and prints the failure, if any, as the single `Ouch:` line.
/// A handled failure is not an error of this function; only a failure to write the report is.
pub fn run_and_report<S: Subsystem>(session: &Session<S>, out: &mut impl Write) -> std::io::Result<()> {
    match session.run(out) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("Run aborted: {:?}", e);
            report::failure(out, &e)
        }
    }
}
