//! The Q panel: decides, for the current letter of Q, which counters
//! receive a pulse.
//!
//! Registers are written one octet at a time.  A write is accepted
//! only if the unit's registers, taken together, still describe a
//! valid configuration.
use tracing::{Level, event};

use base::address::{N_Q_PANEL_BOTTOM_UNITS, N_Q_PANEL_TOP_UNITS};
use base::qpanel::{QPanelBottomUnitConfig, QPanelNegatingConfig, QPanelTopUnitConfig};

const ALL_COUNTERS: u8 = 0x1f;

#[derive(Debug, Clone, Default)]
pub struct QPanel {
    top: [QPanelTopUnitConfig; N_Q_PANEL_TOP_UNITS],
    bottom: [QPanelBottomUnitConfig; N_Q_PANEL_BOTTOM_UNITS],
    negating: QPanelNegatingConfig,
}

impl QPanel {
    /// Write register `offset` (0-2) of top unit `unit`.
    pub fn write_top(&mut self, unit: usize, offset: usize, value: u8) -> bool {
        let mut regs = self.top[unit].encode();
        regs[offset] = value;
        match QPanelTopUnitConfig::decode(regs) {
            Ok(cfg) => {
                event!(Level::DEBUG, "Q panel top unit {unit}: {cfg:?}");
                self.top[unit] = cfg;
                true
            }
            Err(e) => {
                event!(Level::WARN, "Q panel top unit {unit}: {e}");
                false
            }
        }
    }

    /// Write register `offset` (0-1) of bottom unit `unit`.
    pub fn write_bottom(&mut self, unit: usize, offset: usize, value: u8) -> bool {
        let mut regs = self.bottom[unit].encode();
        regs[offset] = value;
        match QPanelBottomUnitConfig::decode(regs) {
            Ok(cfg) => {
                event!(Level::DEBUG, "Q panel bottom unit {unit}: {cfg:?}");
                self.bottom[unit] = cfg;
                true
            }
            Err(e) => {
                event!(Level::WARN, "Q panel bottom unit {unit}: {e}");
                false
            }
        }
    }

    pub fn write_negating(&mut self, offset: usize, value: u8) -> bool {
        let mut regs = self.negating.encode();
        regs[offset] = value;
        match QPanelNegatingConfig::decode(regs) {
            Ok(cfg) => {
                self.negating = cfg;
                true
            }
            Err(e) => {
                event!(Level::WARN, "Q panel negation: {e}");
                false
            }
        }
    }

    /// The counter mask A for the letter `q`; bit 0x10 is counter 0.
    pub fn counter_mask(&self, q: u8) -> u8 {
        let top = self
            .top
            .iter()
            .filter(|unit| !unit.passes(q))
            .fold(ALL_COUNTERS, |acc, unit| acc & !unit.counter_enable());
        let bottom = self
            .bottom
            .iter()
            .filter(|unit| !unit.passes(q))
            .fold(ALL_COUNTERS, |acc, unit| acc & !unit.counter_enable());
        ((top ^ self.negating.per_top_unit_negate()) & bottom) ^ self.negating.global_negate()
    }
}
