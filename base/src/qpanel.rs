//! Configuration of the Q panel, the combining network which decides
//! which counters receive a pulse for each letter of Q.
//!
//! Every mask here has five bits.  Bit 0x10 is impulse 1 (or counter
//! 0); bit 0x01 is impulse 5 (or counter 4).

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::{RangeError, check_5bit};

const NEGATE_BIT: u8 = 0x80;

/// A top unit tests some impulses of Q against a target pattern.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QPanelTopUnitConfig {
    #[cfg_attr(test, strategy(0..0x20u8))]
    match_enable: u8,
    #[cfg_attr(test, strategy(0..0x20u8))]
    match_target: u8,
    negate: bool,
    #[cfg_attr(test, strategy(0..0x20u8))]
    counter_enable: u8,
}

impl QPanelTopUnitConfig {
    /// A unit which never affects any counter.
    pub const NOP: QPanelTopUnitConfig = QPanelTopUnitConfig {
        match_enable: 0,
        match_target: 0,
        negate: false,
        counter_enable: 0,
    };

    pub fn new(
        match_enable: u8,
        match_target: u8,
        negate: bool,
        counter_enable: u8,
    ) -> Result<QPanelTopUnitConfig, RangeError> {
        Ok(QPanelTopUnitConfig {
            match_enable: check_5bit("match enable mask", match_enable)?,
            match_target: check_5bit("match target", match_target)?,
            negate,
            counter_enable: check_5bit("counter enable mask", counter_enable)?,
        })
    }

    pub fn match_enable(&self) -> u8 {
        self.match_enable
    }

    pub fn match_target(&self) -> u8 {
        self.match_target
    }

    pub fn negate(&self) -> bool {
        self.negate
    }

    pub fn counter_enable(&self) -> u8 {
        self.counter_enable
    }

    /// Whether this unit's condition holds for the letter `q`.
    #[must_use]
    pub fn passes(&self, q: u8) -> bool {
        let matched = (q & self.match_enable) == (self.match_target & self.match_enable);
        matched != self.negate
    }

    /// The three register values, in address order.
    #[must_use]
    pub fn encode(&self) -> [u8; 3] {
        [
            self.match_enable,
            self.match_target,
            self.counter_enable | if self.negate { NEGATE_BIT } else { 0 },
        ]
    }

    pub fn decode(regs: [u8; 3]) -> Result<QPanelTopUnitConfig, RangeError> {
        QPanelTopUnitConfig::new(
            regs[0],
            regs[1],
            regs[2] & NEGATE_BIT != 0,
            regs[2] & !NEGATE_BIT,
        )
    }
}

/// A bottom unit tests the parity of some impulses of Q.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QPanelBottomUnitConfig {
    #[cfg_attr(test, strategy(0..0x20u8))]
    coefficient: u8,
    target_bit: bool,
    #[cfg_attr(test, strategy(0..0x20u8))]
    counter_enable: u8,
}

impl QPanelBottomUnitConfig {
    pub const NOP: QPanelBottomUnitConfig = QPanelBottomUnitConfig {
        coefficient: 0,
        target_bit: false,
        counter_enable: 0,
    };

    pub fn new(
        coefficient: u8,
        target_bit: bool,
        counter_enable: u8,
    ) -> Result<QPanelBottomUnitConfig, RangeError> {
        Ok(QPanelBottomUnitConfig {
            coefficient: check_5bit("coefficient mask", coefficient)?,
            target_bit,
            counter_enable: check_5bit("counter enable mask", counter_enable)?,
        })
    }

    pub fn coefficient(&self) -> u8 {
        self.coefficient
    }

    pub fn target_bit(&self) -> bool {
        self.target_bit
    }

    pub fn counter_enable(&self) -> u8 {
        self.counter_enable
    }

    /// Whether the parity of the selected impulses of `q` equals the
    /// target bit.
    #[must_use]
    pub fn passes(&self, q: u8) -> bool {
        let odd = (q & self.coefficient).count_ones() % 2 == 1;
        odd == self.target_bit
    }

    #[must_use]
    pub fn encode(&self) -> [u8; 2] {
        [
            self.coefficient,
            self.counter_enable | if self.target_bit { NEGATE_BIT } else { 0 },
        ]
    }

    pub fn decode(regs: [u8; 2]) -> Result<QPanelBottomUnitConfig, RangeError> {
        QPanelBottomUnitConfig::new(
            regs[0],
            regs[1] & NEGATE_BIT != 0,
            regs[1] & !NEGATE_BIT,
        )
    }
}

/// Negation applied after the units have been combined.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QPanelNegatingConfig {
    #[cfg_attr(test, strategy(0..0x20u8))]
    per_top_unit_negate: u8,
    #[cfg_attr(test, strategy(0..0x20u8))]
    global_negate: u8,
}

impl QPanelNegatingConfig {
    pub const NOP: QPanelNegatingConfig = QPanelNegatingConfig {
        per_top_unit_negate: 0,
        global_negate: 0,
    };

    pub fn new(
        per_top_unit_negate: u8,
        global_negate: u8,
    ) -> Result<QPanelNegatingConfig, RangeError> {
        Ok(QPanelNegatingConfig {
            per_top_unit_negate: check_5bit("top-unit negation mask", per_top_unit_negate)?,
            global_negate: check_5bit("global negation mask", global_negate)?,
        })
    }

    pub fn per_top_unit_negate(&self) -> u8 {
        self.per_top_unit_negate
    }

    pub fn global_negate(&self) -> u8 {
        self.global_negate
    }

    #[must_use]
    pub fn encode(&self) -> [u8; 2] {
        [self.per_top_unit_negate, self.global_negate]
    }

    pub fn decode(regs: [u8; 2]) -> Result<QPanelNegatingConfig, RangeError> {
        QPanelNegatingConfig::new(regs[0], regs[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn test_top_unit_encoding() {
        // "101-- == 10000": impulses 1 and 3 set, impulse 2 clear,
        // counting into counter 0.
        let cfg = QPanelTopUnitConfig::new(0x1c, 0x14, false, 0x10).unwrap();
        assert_eq!(cfg.encode(), [0x1c, 0x14, 0x10]);
        let cfg = QPanelTopUnitConfig::new(0x1a, 0x1a, true, 0x08).unwrap();
        assert_eq!(cfg.encode(), [0x1a, 0x1a, 0x88]);
        assert_eq!(QPanelTopUnitConfig::decode([0x1a, 0x1a, 0x88]), Ok(cfg));
    }

    #[test]
    fn test_top_unit_rejects_wide_masks() {
        assert!(QPanelTopUnitConfig::new(0x20, 0, false, 0).is_err());
        assert!(QPanelTopUnitConfig::new(0, 0x20, false, 0).is_err());
        assert!(QPanelTopUnitConfig::new(0, 0, false, 0x20).is_err());
        assert!(QPanelTopUnitConfig::decode([0, 0, 0x40]).is_err());
    }

    #[test]
    fn test_top_unit_condition() {
        let cfg = QPanelTopUnitConfig::new(0x1c, 0x14, false, 0x10).unwrap();
        assert!(cfg.passes(0b10100));
        assert!(cfg.passes(0b10111));
        assert!(!cfg.passes(0b11100));
        let negated = QPanelTopUnitConfig::new(0x1c, 0x14, true, 0x10).unwrap();
        assert!(!negated.passes(0b10100));
        assert!(negated.passes(0b11100));
        // No impulses selected: always matches.
        assert!(QPanelTopUnitConfig::NOP.passes(0x1f));
    }

    #[test]
    fn test_bottom_unit() {
        // "11--- 0 00100": impulses 1 and 2 agree.
        let cfg = QPanelBottomUnitConfig::new(0x18, false, 0x04).unwrap();
        assert_eq!(cfg.encode(), [0x18, 0x04]);
        assert!(cfg.passes(0b11000));
        assert!(cfg.passes(0b00111));
        assert!(!cfg.passes(0b10000));
        let odd = QPanelBottomUnitConfig::new(0x05, true, 0x04).unwrap();
        assert_eq!(odd.encode(), [0x05, 0x84]);
        assert!(odd.passes(0b00001));
        assert!(!odd.passes(0b00101));
        assert!(QPanelBottomUnitConfig::new(0x20, false, 0).is_err());
    }

    #[test]
    fn test_negating() {
        let cfg = QPanelNegatingConfig::new(0x13, 0x0e).unwrap();
        assert_eq!(cfg.encode(), [0x13, 0x0e]);
        assert!(QPanelNegatingConfig::new(0x13, 0x2e).is_err());
    }

    #[proptest]
    fn top_unit_registers_decode_to_same_config(cfg: QPanelTopUnitConfig) {
        assert_eq!(QPanelTopUnitConfig::decode(cfg.encode()), Ok(cfg));
    }

    #[proptest]
    fn bottom_unit_registers_decode_to_same_config(cfg: QPanelBottomUnitConfig) {
        assert_eq!(QPanelBottomUnitConfig::decode(cfg.encode()), Ok(cfg));
    }
}
