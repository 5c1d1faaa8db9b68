//! Console rendering of a run.

use std::fmt::Display;
use std::io::Write;

use crate::error::Error;

/// Writes `reader name: <name>`.
pub fn reader_name(out: &mut impl Write, name: impl Display) -> std::io::Result<()> {
    writeln!(out, "reader name: {}", name)
}

/// Writes `response: ` followed by every octet of the buffer as two uppercase hex digits and a
/// space, trailing zeros included.
pub fn response(out: &mut impl Write, rx: &[u8]) -> std::io::Result<()> {
    write!(out, "response: ")?;
    for byte in rx {
        write!(out, "{:02X} ", byte)?;
    }

    writeln!(out)
}

/// Writes the buffer decoded as UTF-8, replacing invalid sequences and keeping the NULs.
pub fn text(out: &mut impl Write, rx: &[u8]) -> std::io::Result<()> {
    writeln!(out, "{}", String::from_utf8_lossy(rx))
}

/// Writes `Ouch: <message> (<kind>)`.
pub fn failure(out: &mut impl Write, error: &Error) -> std::io::Result<()> {
    writeln!(out, "Ouch: {} ({:?})", error.message(), error.kind())
}
