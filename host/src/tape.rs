//! Punching and reading the tape loop.
use base::address::{self, ack, sub};
use base::prelude::*;

use crate::error::Fault;
use crate::session::Colossus;

/// The letter punched after a message to end it.
pub const STOP_LETTER: u8 = 0x3f;

impl<T: Transport> Colossus<T> {
    pub fn clear_tape(&mut self) -> Result<(), Fault> {
        self.checked(address::TAPE_CLEAR, 0, ack::TAPE_CLEAR)
    }

    /// Punch `letters` from the start of the tape, optionally followed
    /// by [`STOP_LETTER`].  The letters are sent as data-only
    /// commands after the first.
    pub fn punch_tape(&mut self, letters: &[u8], append_stop: bool) -> Result<(), Fault> {
        self.checked(address::TAPE_WRITE_RESET, 0, ack::TAPE_WRITE_RESET)?;
        if let Some((first, rest)) = letters.split_first() {
            self.checked(address::TAPE_PUNCH, *first, ack::TAPE_PUNCH)?;
            for &letter in rest {
                self.checked_data_only(letter, ack::TAPE_PUNCH)?;
            }
        }
        if append_stop {
            self.checked(address::TAPE_PUNCH, STOP_LETTER, ack::TAPE_PUNCH)?;
        }
        Ok(())
    }

    pub fn reset_tape_read_pointer(&mut self) -> Result<(), Fault> {
        self.checked(address::TAPE_READ, sub::TAPE_REWIND, ack::TAPE_REWIND)
    }

    pub fn read_tape_and_advance(&mut self) -> Result<u8, Fault> {
        self.value(address::TAPE_READ, sub::TAPE_READ_ADVANCE)
    }

    /// The first `n` octets of the tape.
    pub fn read_tape_contents(&mut self, n: usize) -> Result<Vec<u8>, Fault> {
        self.reset_tape_read_pointer()?;
        (0..n).map(|_| self.read_tape_and_advance()).collect()
    }
}
