//! Short APDU commands as defined by ISO/IEC 7816-4.

mod command;

pub use command::Command;

pub const CLA_DEFAULT: u8 = 0x00;

pub(crate) mod ins {
    pub const SELECT_FILE: u8 = 0xA4;
    pub const READ_BINARY: u8 = 0xB0;
}
