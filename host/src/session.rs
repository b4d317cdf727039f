//! A session with one device.
//!
//! Every operation takes `&mut self`: the bus is half-duplex and a
//! session has exactly one owner.  The operations themselves are
//! spread over the sibling modules by hardware unit.
use tracing::{Level, event, span};

use base::address;
use base::prelude::*;

use crate::channel::Channel;
use crate::error::Fault;

#[derive(Debug)]
pub struct Colossus<T: Transport> {
    channel: Channel<T>,
}

impl<T: Transport> Colossus<T> {
    /// Wait for the device to become ready, then put the wheel
    /// settings, the step-count-vector configuration and the
    /// thresholds into their no-op state.
    pub fn new(transport: T) -> Result<Colossus<T>, Fault> {
        let span = span!(Level::INFO, "session start");
        let _enter = span.enter();
        let mut channel = Channel::new(transport);
        channel.wait_until_ready()?;
        let mut session = Colossus { channel };
        session.reset_all_stepping()?;
        session.reset_all_step_count_vector_configs()?;
        session.reset_all_thresholds()?;
        event!(
            Level::INFO,
            "session ready after {} commands",
            session.channel.commands_sent()
        );
        Ok(session)
    }

    /// Direct access to the command channel, for commands this type
    /// has no operation for.
    pub fn channel(&mut self) -> &mut Channel<T> {
        &mut self.channel
    }

    pub fn into_transport(self) -> T {
        self.channel.into_transport()
    }

    pub(crate) fn checked(&mut self, address: u8, data: u8, ack: u8) -> Result<(), Fault> {
        self.channel.execute_checked(Command::new(address, data), ack)
    }

    /// Deliver `data` to the most recently addressed register.
    pub(crate) fn checked_data_only(&mut self, data: u8, ack: u8) -> Result<(), Fault> {
        self.channel.execute_checked(Command::bare(data), ack)
    }

    pub(crate) fn value(&mut self, address: u8, data: u8) -> Result<u8, Fault> {
        self.channel.execute_value(Command::new(address, data))
    }

    /// Read a 16-bit quantity as two octets, least significant
    /// first.
    pub(crate) fn value_u16(
        &mut self,
        address: u8,
        lsb_selector: u8,
        msb_selector: u8,
    ) -> Result<u16, Fault> {
        let lsb = self.value(address, lsb_selector)?;
        let msb = self.value(address, msb_selector)?;
        Ok(u16::from_le_bytes([lsb, msb]))
    }

    /// Bus self-test: the device returns `(n0 + n1) mod 16`.
    pub fn add_nibbles(&mut self, n0: u8, n1: u8) -> Result<u8, Fault> {
        RangeError::check("nibble", n0.into(), 16)?;
        RangeError::check("nibble", n1.into(), 16)?;
        self.value(address::NIBBLE_ADDER, (n1 << 4) | n0)
    }
}
