//! Counters, thresholds, the comparator and the printer.
use tracing::{Level, event};

use base::address::{self, ack, sub};
use base::prelude::*;

use crate::error::{Fault, ProtocolFault};
use crate::session::Colossus;

fn counter_index(counter: usize) -> Result<u8, Fault> {
    RangeError::check("counter", counter as u32, N_COUNTERS as u32)?;
    Ok(counter as u8)
}

impl<T: Transport> Colossus<T> {
    /// Zero the live counters.
    pub fn reset_counters(&mut self) -> Result<(), Fault> {
        self.checked(address::COUNTERS, sub::COUNTERS_RESET, ack::COUNTERS_RESET)
    }

    /// Count the current sprocket.
    pub fn enable_counters_one_shot(&mut self) -> Result<(), Fault> {
        self.checked(
            address::COUNTERS,
            sub::COUNTERS_COUNT_ONE_SHOT,
            ack::COUNTERS_COUNT_ONE_SHOT,
        )
    }

    /// Copy the live counters into the readable copy.
    pub fn latch_counters(&mut self) -> Result<(), Fault> {
        self.checked(address::COUNTERS, sub::COUNTERS_LATCH, ack::COUNTERS_LATCH)
    }

    /// The latched value of `counter`.
    pub fn read_counter(&mut self, counter: usize) -> Result<u16, Fault> {
        let i = counter_index(counter)?;
        self.value_u16(address::COUNTERS, i, sub::COUNTER_MSB + i)
    }

    pub fn read_all_counters(&mut self) -> Result<[u16; N_COUNTERS], Fault> {
        let mut values = [0u16; N_COUNTERS];
        for (i, value) in values.iter_mut().enumerate() {
            *value = self.read_counter(i)?;
        }
        Ok(values)
    }

    pub fn set_threshold(&mut self, counter: usize, cfg: &ThresholdConfig) -> Result<(), Fault> {
        let i = counter_index(counter)?;
        for (offset, value) in (0u8..).zip(cfg.encode()) {
            self.checked(address::threshold(i.into(), offset), value, ack::CONFIG)?;
        }
        Ok(())
    }

    pub fn reset_all_thresholds(&mut self) -> Result<(), Fault> {
        for counter in 0..N_COUNTERS {
            self.set_threshold(counter, &ThresholdConfig::NEVER_PRINT)?;
        }
        Ok(())
    }

    /// The wheel settings last copied into the comparator.
    pub fn comparator_settings(&mut self) -> Result<[u8; N_WHEELS], Fault> {
        let mut settings = [0u8; N_WHEELS];
        for (i, setting) in (0u8..).zip(settings.iter_mut()) {
            *setting = self.value(address::COMPARATOR, i)?;
        }
        Ok(settings)
    }

    /// The counter values last copied into the comparator.
    pub fn comparator_counters(&mut self) -> Result<[u16; N_COUNTERS], Fault> {
        let mut values = [0u16; N_COUNTERS];
        for (i, value) in (0u8..).zip(values.iter_mut()) {
            *value = self.value_u16(
                address::COMPARATOR,
                sub::COMPARATOR_COUNTER_LSB + i,
                sub::COMPARATOR_COUNTER_MSB + i,
            )?;
        }
        Ok(values)
    }

    /// Which counters exceed their thresholds (counter 0 in bit 0x10).
    pub fn gt_vector(&mut self) -> Result<u8, Fault> {
        self.value(address::COMPARATOR, sub::COMPARATOR_GT_VECTOR)
    }

    /// Which counters are below their thresholds.
    pub fn lt_vector(&mut self) -> Result<u8, Fault> {
        self.value(address::COMPARATOR, sub::COMPARATOR_LT_VECTOR)
    }

    pub fn print_required_vector(&mut self) -> Result<u8, Fault> {
        self.value(address::COMPARATOR, sub::COMPARATOR_PRINT_VECTOR)
    }

    pub fn print_required(&mut self) -> Result<bool, Fault> {
        Ok(self.value(address::COMPARATOR, sub::COMPARATOR_PRINT_REQUIRED)? != 0)
    }

    pub fn printer_reset(&mut self) -> Result<(), Fault> {
        self.checked(address::PRINTER_RESET, 0, ack::PRINTER_RESET)
    }

    pub fn printer_write(&mut self, octets: &[u8]) -> Result<(), Fault> {
        for &octet in octets {
            self.checked(address::PRINTER_WRITE, octet, ack::CONFIG)?;
        }
        Ok(())
    }

    /// Everything in the printer buffer.
    pub fn printer_contents(&mut self) -> Result<Vec<u8>, Fault> {
        let len = self.value_u16(
            address::PRINTER_READ,
            sub::PRINTER_LENGTH_LSB,
            sub::PRINTER_LENGTH_MSB,
        )?;
        self.checked(address::PRINTER_READ, sub::PRINTER_REWIND, ack::PRINTER_REWIND)?;
        (0..len)
            .map(|_| self.value(address::PRINTER_READ, sub::PRINTER_READ_NEXT))
            .collect()
    }

    /// The printer buffer, decoded into records.
    pub fn printer_records(&mut self) -> Result<Vec<PrintRecord>, Fault> {
        let octets = self.printer_contents()?;
        let records =
            PrintRecord::all_from_octets(&octets).map_err(ProtocolFault::TruncatedPrintout)?;
        event!(Level::DEBUG, "printer holds {} records", records.len());
        Ok(records)
    }
}
