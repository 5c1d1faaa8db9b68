//! Fixed command sequences walking the card's file tree down to an EF and reading it.

use crate::apdu::Command;

const SELECT_P1: u8 = 0x00;
const SELECT_P2: u8 = 0x00;

const MF: [u8; 2] = [0x3F, 0x00];

const DF_PERSONAL: [u8; 2] = [0x11, 0x00];
const EF_PERSONAL: [u8; 2] = [0x11, 0x02];

const DF_IDENTITY: [u8; 2] = [0x10, 0x00];
const EF_CARD_ID: [u8; 2] = [0x10, 0x03];

/// One command of a script, with a label for logs.
#[derive(Clone, Debug)]
pub struct Step {
    pub label: &'static str,
    pub command: Command,
}

impl Step {
    fn select(label: &'static str, id: [u8; 2]) -> Self {
        Self {
            label,
            command: Command::select_file(SELECT_P1, SELECT_P2, id.into()),
        }
    }

    fn read_binary() -> Self {
        Self {
            label: "READ_BIN",
            command: Command::read_binary(0x00, 0x00, 0x00),
        }
    }
}

/// An ordered, immutable sequence of commands.
#[derive(Clone, Debug)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Selects the MF, DF `11 00` and EF `11 02`, then reads the EF.
    pub fn personal() -> Self {
        Self {
            steps: vec![
                Step::select("SELECT_MF", MF),
                Step::select("SELECT_DF1", DF_PERSONAL),
                Step::select("SELECT_EF_PERS", EF_PERSONAL),
                Step::read_binary(),
            ],
        }
    }

    /// Selects the MF, DF `10 00` and EF `10 03`, then reads the EF.
    pub fn card_identity() -> Self {
        Self {
            steps: vec![
                Step::select("SELECT_MF", MF),
                Step::select("SELECT_DF0", DF_IDENTITY),
                Step::select("SELECT_EF_ID_CARTA", EF_CARD_ID),
                Step::read_binary(),
            ],
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::personal()
    }
}
