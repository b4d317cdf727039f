use std::fmt::{self, Display, Formatter};

use base::address::fault;

/// A command the bus could not carry out.  The device reports these
/// by raising the error flag and returning [`BusFault::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    NoLatchedAddress,
    UnknownBodyAddress(u8),
    UnknownHeadAddress(u8),
    BadData { address: u8, data: u8 },
    /// A print record or octet did not fit in the printer buffer.
    PrinterFull { address: u8 },
}

impl BusFault {
    pub const fn code(&self) -> u8 {
        match self {
            BusFault::NoLatchedAddress => fault::NO_LATCHED_ADDRESS,
            BusFault::UnknownBodyAddress(_) => fault::UNKNOWN_BODY_ADDRESS,
            BusFault::UnknownHeadAddress(_) => fault::UNKNOWN_HEAD_ADDRESS,
            BusFault::BadData { .. } | BusFault::PrinterFull { .. } => fault::BAD_DATA,
        }
    }
}

impl Display for BusFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            BusFault::NoLatchedAddress => {
                f.write_str("data byte received but no address has been latched")
            }
            BusFault::UnknownBodyAddress(address) => {
                write!(f, "no body unit answers at address {address}")
            }
            BusFault::UnknownHeadAddress(address) => {
                write!(f, "no head unit answers at address {address}")
            }
            BusFault::BadData { address, data } => {
                write!(f, "data {data:#04x} is not meaningful at address {address}")
            }
            BusFault::PrinterFull { address } => {
                write!(f, "printer buffer is full (command at address {address})")
            }
        }
    }
}

impl std::error::Error for BusFault {}
