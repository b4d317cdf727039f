//! The paper tape loop.
//!
//! Each position holds one raw octet.  The low five bits are the
//! letter; bit 0x20 marks the end of the message.  Unpunched and
//! erased positions hold [`ERASED`], which has the stop bit set, so
//! a tape pass never runs off the end of the punched data.
use tracing::{Level, event};

use crate::fault::BusFault;

pub const CAPACITY: usize = 16384;
pub const ERASED: u8 = 0xa5;
pub const STOP_BIT: u8 = 0x20;
pub const LETTER_MASK: u8 = 0x1f;

/// Whether `raw` marks the end of the message.
pub const fn is_stop(raw: u8) -> bool {
    raw & STOP_BIT != 0
}

/// The form in which the Z snoop reports a raw tape octet: the
/// letter, with the stop bit moved up to bit 7.
pub const fn snooped(raw: u8) -> u8 {
    (raw & LETTER_MASK) | if is_stop(raw) { 0x80 } else { 0 }
}

#[derive(Debug, Clone)]
pub struct Tape {
    data: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
}

impl Default for Tape {
    fn default() -> Tape {
        Tape::new()
    }
}

impl Tape {
    pub fn new() -> Tape {
        Tape {
            data: vec![ERASED; CAPACITY],
            read_pos: 0,
            write_pos: 0,
        }
    }

    pub fn clear(&mut self) {
        event!(Level::DEBUG, "erasing tape");
        self.data.fill(ERASED);
        self.read_pos = 0;
        self.write_pos = 0;
    }

    /// The raw octet at `pos`; positions past the end of the loop read
    /// as erased.
    pub fn at(&self, pos: usize) -> u8 {
        self.data.get(pos).copied().unwrap_or(ERASED)
    }

    pub fn rewind(&mut self) {
        self.read_pos = 0;
    }

    pub fn read_and_advance(&mut self) -> u8 {
        let raw = self.at(self.read_pos);
        if self.read_pos < CAPACITY {
            self.read_pos += 1;
        }
        raw
    }

    pub fn reset_write_pointer(&mut self) {
        self.write_pos = 0;
    }

    pub fn punch(&mut self, raw: u8) -> Result<(), BusFault> {
        match self.data.get_mut(self.write_pos) {
            Some(slot) => {
                *slot = raw;
                self.write_pos += 1;
                Ok(())
            }
            None => {
                event!(Level::WARN, "tape is full, cannot punch {raw:#04x}");
                Err(BusFault::BadData {
                    address: base::address::TAPE_PUNCH,
                    data: raw,
                })
            }
        }
    }
}
