//! Set-total thresholds and the comparisons built from them.
//!
//! Each of the five counters has a threshold and an operation.  The
//! comparator packs per-counter results into 5-bit vectors with
//! counter 0 in the most significant position (bit 0x10).
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::RangeError;
use super::wheels::N_COUNTERS;

/// Thresholds are 14-bit quantities.
pub const THRESHOLD_LIMIT: u16 = 1 << 14;

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ThresholdOperation {
    GreaterThan,
    LessThan,
    AlwaysTrue,
}

impl ThresholdOperation {
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            ThresholdOperation::GreaterThan => 0,
            ThresholdOperation::LessThan => 1,
            ThresholdOperation::AlwaysTrue => 2,
        }
    }
}

impl TryFrom<u8> for ThresholdOperation {
    type Error = RangeError;
    fn try_from(code: u8) -> Result<ThresholdOperation, RangeError> {
        match code {
            0 => Ok(ThresholdOperation::GreaterThan),
            1 => Ok(ThresholdOperation::LessThan),
            2 => Ok(ThresholdOperation::AlwaysTrue),
            n => Err(RangeError::TooLarge {
                what: "threshold operation",
                value: n.into(),
                limit: 3,
            }),
        }
    }
}

impl Display for ThresholdOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            ThresholdOperation::GreaterThan => ">",
            ThresholdOperation::LessThan => "<",
            ThresholdOperation::AlwaysTrue => "always",
        })
    }
}

#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ThresholdConfig {
    #[cfg_attr(test, strategy(0..THRESHOLD_LIMIT))]
    threshold: u16,
    operation: ThresholdOperation,
}

impl ThresholdConfig {
    /// Always print, whatever the count.
    pub const ALWAYS_PRINT: ThresholdConfig = ThresholdConfig {
        threshold: 0,
        operation: ThresholdOperation::AlwaysTrue,
    };

    /// No count is below zero, so this never prints.
    pub const NEVER_PRINT: ThresholdConfig = ThresholdConfig {
        threshold: 0,
        operation: ThresholdOperation::LessThan,
    };

    pub fn new(threshold: u16, operation: ThresholdOperation) -> Result<ThresholdConfig, RangeError> {
        RangeError::check("threshold", threshold.into(), THRESHOLD_LIMIT.into())?;
        Ok(ThresholdConfig {
            threshold,
            operation,
        })
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn operation(&self) -> ThresholdOperation {
        self.operation
    }

    /// Register values: `(threshold mod 256, (threshold div 256) | op << 6)`.
    #[must_use]
    pub fn encode(&self) -> [u8; 2] {
        let [low, high] = self.threshold.to_le_bytes();
        [low, high | (self.operation.code() << 6)]
    }

    pub fn decode(regs: [u8; 2]) -> Result<ThresholdConfig, RangeError> {
        let operation = ThresholdOperation::try_from(regs[1] >> 6)?;
        let threshold = u16::from_le_bytes([regs[0], regs[1] & 0x3f]);
        ThresholdConfig::new(threshold, operation)
    }

    /// Apply this configuration's own operation to `value`.
    #[must_use]
    pub fn evaluate(&self, value: u16) -> bool {
        evaluate_threshold(value, self.threshold, self.operation)
    }
}

impl Default for ThresholdConfig {
    fn default() -> ThresholdConfig {
        ThresholdConfig::NEVER_PRINT
    }
}

#[must_use]
pub fn evaluate_threshold(value: u16, threshold: u16, operation: ThresholdOperation) -> bool {
    match operation {
        ThresholdOperation::GreaterThan => value > threshold,
        ThresholdOperation::LessThan => value < threshold,
        ThresholdOperation::AlwaysTrue => true,
    }
}

/// Pack per-counter booleans, counter 0 in bit 0x10.
#[must_use]
pub fn pack_counter_vector(bits: [bool; N_COUNTERS]) -> u8 {
    bits.iter()
        .fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit))
}

fn vector_with<F>(counters: &[u16; N_COUNTERS], configs: &[ThresholdConfig; N_COUNTERS], op: F) -> u8
where
    F: Fn(&ThresholdConfig) -> ThresholdOperation,
{
    let mut bits = [false; N_COUNTERS];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = evaluate_threshold(counters[i], configs[i].threshold, op(&configs[i]));
    }
    pack_counter_vector(bits)
}

/// Which counters exceed their thresholds.
#[must_use]
pub fn gt_vector(counters: &[u16; N_COUNTERS], configs: &[ThresholdConfig; N_COUNTERS]) -> u8 {
    vector_with(counters, configs, |_| ThresholdOperation::GreaterThan)
}

/// Which counters are below their thresholds.
#[must_use]
pub fn lt_vector(counters: &[u16; N_COUNTERS], configs: &[ThresholdConfig; N_COUNTERS]) -> u8 {
    vector_with(counters, configs, |_| ThresholdOperation::LessThan)
}

/// Which counters satisfy their own configured operation.
#[must_use]
pub fn print_required_vector(
    counters: &[u16; N_COUNTERS],
    configs: &[ThresholdConfig; N_COUNTERS],
) -> u8 {
    vector_with(counters, configs, ThresholdConfig::operation)
}

#[must_use]
pub fn print_required(counters: &[u16; N_COUNTERS], configs: &[ThresholdConfig; N_COUNTERS]) -> bool {
    print_required_vector(counters, configs) != 0
}
