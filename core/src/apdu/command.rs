use crate::apdu;
use crate::apdu::ins;

/// An APDU command to be transmitted
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    le: Option<u8>,
    payload: Option<Vec<u8>>,
}

impl Command {
    /// Constructs an command with CLA, INS, P1, and P2.
    /// No payloads will be transmitted or received.
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            le: None,
            payload: None,
        }
    }

    /// Constructs an command with CLA, INS, P1, P2, and Le.
    /// A payload will be received.
    pub fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: u8) -> Self {
        Self {
            le: Some(le),
            ..Self::new(cla, ins, p1, p2)
        }
    }

    /// Constructs an command with CLA, INS, P1, P2, and a payload.
    /// No payload will be received.
    pub fn new_with_payload(cla: u8, ins: u8, p1: u8, p2: u8, payload: Vec<u8>) -> Self {
        Self {
            payload: Some(payload),
            ..Self::new(cla, ins, p1, p2)
        }
    }

    /// Constructs a `SELECT FILE` command.
    pub fn select_file(p1: u8, p2: u8, payload: Vec<u8>) -> Self {
        match payload.len() {
            0 => Self::new(apdu::CLA_DEFAULT, ins::SELECT_FILE, p1, p2),
            _ => Self::new_with_payload(apdu::CLA_DEFAULT, ins::SELECT_FILE, p1, p2, payload),
        }
    }

    /// Constructs a `READ BINARY` command.
    /// `le` of zero asks the card for as many octets as it has, up to 256.
    pub fn read_binary(p1: u8, p2: u8, le: u8) -> Self {
        Self::new_with_le(apdu::CLA_DEFAULT, ins::READ_BINARY, p1, p2, le)
    }

    /// Serializes the command into octets: `CLA INS P1 P2 [Lc data] [Le]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer: Vec<u8> = vec![self.cla, self.ins, self.p1, self.p2];
        if let Some(p) = &self.payload {
            buffer.push(p.len() as u8);
            buffer.extend_from_slice(p);
        }

        if let Some(l) = self.le {
            buffer.push(l);
        }

        buffer
    }
}
