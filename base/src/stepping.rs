//! Per-wheel stepping modes for the step-count vector.
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

#[cfg(test)]
use test_strategy::Arbitrary;

use super::error::RangeError;

/// How a wheel's count advances when the step-count vector is
/// pulsed.  The flags combine freely.
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SteppingMode {
    /// Advance on every pulse.
    pub fast: bool,
    /// Advance once for each pulse in which some wheel triggered.
    pub slow: bool,
    /// Emit a trigger when a fast advance wraps this wheel to 0.
    pub trigger: bool,
    /// Disregard this wheel when deciding whether the run has ended.
    pub ignore_on_completion: bool,
}

impl SteppingMode {
    pub const NONE: SteppingMode = SteppingMode {
        fast: false,
        slow: false,
        trigger: false,
        ignore_on_completion: false,
    };

    pub const FAST: SteppingMode = SteppingMode {
        fast: true,
        ..SteppingMode::NONE
    };

    pub const FAST_TRIGGER: SteppingMode = SteppingMode {
        fast: true,
        trigger: true,
        ..SteppingMode::NONE
    };

    pub const SLOW: SteppingMode = SteppingMode {
        slow: true,
        ..SteppingMode::NONE
    };

    /// Only the "ignore on completion" flag.
    pub const IGNORED: SteppingMode = SteppingMode {
        ignore_on_completion: true,
        ..SteppingMode::NONE
    };

    /// The configuration nibble: `8*fast + 4*slow + 2*trigger + ignore`.
    #[must_use]
    pub const fn nibble(&self) -> u8 {
        (self.fast as u8) << 3
            | (self.slow as u8) << 2
            | (self.trigger as u8) << 1
            | (self.ignore_on_completion as u8)
    }
}

impl From<SteppingMode> for u8 {
    fn from(mode: SteppingMode) -> u8 {
        mode.nibble()
    }
}

impl TryFrom<u8> for SteppingMode {
    type Error = RangeError;
    fn try_from(nibble: u8) -> Result<SteppingMode, RangeError> {
        RangeError::check("stepping mode", nibble.into(), 0x10)?;
        Ok(SteppingMode {
            fast: nibble & 0x8 != 0,
            slow: nibble & 0x4 != 0,
            trigger: nibble & 0x2 != 0,
            ignore_on_completion: nibble & 0x1 != 0,
        })
    }
}

impl Display for SteppingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let flags: Vec<&str> = [
            (self.fast, "fast"),
            (self.slow, "slow"),
            (self.trigger, "trigger"),
            (self.ignore_on_completion, "ignore"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect();
        if flags.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&flags.join("+"))
        }
    }
}
