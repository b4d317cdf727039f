//! The Q selector, which combines the tape and wheel letters into Q.
//!
//! Configuration bits, from the top: Z, delta-Z, chi, delta-chi, psi,
//! delta-psi.  Q is the XOR of each enabled stream.  A delta bit
//! replaces its stream by the XOR of the current and previous letters,
//! and has no effect unless the stream itself is enabled.
use tracing::{Level, event};

/// Configuration values must fit in six bits.
pub const CONFIG_LIMIT: u8 = 0x40;

const Z: u8 = 0x20;
const DELTA_Z: u8 = 0x10;
const CHI: u8 = 0x08;
const DELTA_CHI: u8 = 0x04;
const PSI: u8 = 0x02;
const DELTA_PSI: u8 = 0x01;

/// The letters visible at one sprocket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Letters {
    pub z: u8,
    pub chi: u8,
    pub psi: u8,
}

#[derive(Debug, Clone, Default)]
pub struct QSelector {
    config: u8,
    q: u8,
}

fn stream(config: u8, enable: u8, delta: u8, current: u8, previous: u8) -> u8 {
    match (config & enable != 0, config & delta != 0) {
        (false, _) => 0,
        (true, false) => current,
        (true, true) => current ^ previous,
    }
}

impl QSelector {
    /// Returns `false` (and changes nothing) for values wider than six
    /// bits.
    pub fn configure(&mut self, config: u8) -> bool {
        if config < CONFIG_LIMIT {
            event!(Level::DEBUG, "Q selector configuration {config:#08b}");
            self.config = config;
            true
        } else {
            false
        }
    }

    /// Whether any enabled stream is being differenced.
    pub fn uses_delta(&self) -> bool {
        [(Z, DELTA_Z), (CHI, DELTA_CHI), (PSI, DELTA_PSI)]
            .iter()
            .any(|&(enable, delta)| self.config & enable != 0 && self.config & delta != 0)
    }

    pub fn q(&self) -> u8 {
        self.q
    }

    pub fn reset(&mut self) {
        self.q = 0;
    }

    /// Recompute Q from the letters at the current and previous
    /// sprockets.
    pub fn refresh(&mut self, current: &Letters, previous: &Letters) {
        let c = self.config;
        self.q = stream(c, Z, DELTA_Z, current.z, previous.z)
            ^ stream(c, CHI, DELTA_CHI, current.chi, previous.chi)
            ^ stream(c, PSI, DELTA_PSI, current.psi, previous.psi);
    }
}
