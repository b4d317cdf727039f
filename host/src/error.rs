//! Failures seen by the host.
//!
//! A [`ProtocolFault`] means the conversation with the device can no
//! longer be trusted.  A [`DeviceFault`] means the device understood
//! the command but refused it or acknowledged it unexpectedly.
//! Neither is retried.
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;

use base::prelude::*;

#[derive(Debug)]
pub enum ProtocolFault {
    Transport(io::Error),
    /// The device went away while we were waiting for `awaiting`.
    EndOfStream { awaiting: String },
    Malformed(WireError),
    EchoMismatch { sent: Command, echoed: Command },
    TruncatedPrintout(TruncatedRecord),
}

impl Display for ProtocolFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ProtocolFault::Transport(e) => write!(f, "transport failed: {e}"),
            ProtocolFault::EndOfStream { awaiting } => {
                write!(f, "device closed the stream while we waited for {awaiting}")
            }
            ProtocolFault::Malformed(e) => e.fmt(f),
            ProtocolFault::EchoMismatch { sent, echoed } => {
                write!(f, "sent command {sent} but the device echoed {echoed}")
            }
            ProtocolFault::TruncatedPrintout(e) => e.fmt(f),
        }
    }
}

impl Error for ProtocolFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProtocolFault::Transport(e) => Some(e),
            ProtocolFault::Malformed(e) => Some(e),
            ProtocolFault::TruncatedPrintout(e) => Some(e),
            ProtocolFault::EndOfStream { .. } | ProtocolFault::EchoMismatch { .. } => None,
        }
    }
}

impl From<io::Error> for ProtocolFault {
    fn from(e: io::Error) -> ProtocolFault {
        ProtocolFault::Transport(e)
    }
}

impl From<WireError> for ProtocolFault {
    fn from(e: WireError) -> ProtocolFault {
        ProtocolFault::Malformed(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFault {
    /// The device raised its error flag; `code` says why.
    ErrorFlag { command: Command, code: u8 },
    UnexpectedAck {
        command: Command,
        expected: u8,
        got: u8,
    },
}

impl DeviceFault {
    pub fn command(&self) -> Command {
        match self {
            DeviceFault::ErrorFlag { command, .. } | DeviceFault::UnexpectedAck { command, .. } => {
                *command
            }
        }
    }
}

impl Display for DeviceFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DeviceFault::ErrorFlag { command, code } => {
                write!(f, "device rejected command {command} with error code {code:#04x}")
            }
            DeviceFault::UnexpectedAck {
                command,
                expected,
                got,
            } => write!(
                f,
                "command {command} was acknowledged with {got:#04x} instead of {expected:#04x}"
            ),
        }
    }
}

impl Error for DeviceFault {}

/// Anything a session operation can fail with.
#[derive(Debug)]
pub enum Fault {
    Protocol(ProtocolFault),
    Device(DeviceFault),
    /// Rejected before anything was sent.
    Range(RangeError),
}

impl Display for Fault {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Fault::Protocol(e) => write!(f, "protocol fault: {e}"),
            Fault::Device(e) => write!(f, "device fault: {e}"),
            Fault::Range(e) => write!(f, "invalid request: {e}"),
        }
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Fault::Protocol(e) => Some(e),
            Fault::Device(e) => Some(e),
            Fault::Range(e) => Some(e),
        }
    }
}

impl From<ProtocolFault> for Fault {
    fn from(e: ProtocolFault) -> Fault {
        Fault::Protocol(e)
    }
}

impl From<DeviceFault> for Fault {
    fn from(e: DeviceFault) -> Fault {
        Fault::Device(e)
    }
}

impl From<RangeError> for Fault {
    fn from(e: RangeError) -> Fault {
        Fault::Range(e)
    }
}

impl From<io::Error> for Fault {
    fn from(e: io::Error) -> Fault {
        Fault::Protocol(ProtocolFault::Transport(e))
    }
}

#[test]
fn test_display() {
    let e = Fault::from(DeviceFault::ErrorFlag {
        command: Command::new(0xfe, 0),
        code: 9,
    });
    assert_eq!(
        e.to_string(),
        "device fault: device rejected command fe00 with error code 0x09"
    );
    let e = ProtocolFault::EchoMismatch {
        sent: Command::new(8, 0x12),
        echoed: Command::new(8, 0x13),
    };
    assert_eq!(
        e.to_string(),
        "sent command 0812 but the device echoed 0813"
    );
}
