//! Basic error reporting.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Represents a configuration value which the hardware register
/// cannot hold.  These are detected before anything is sent to the
/// device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeError {
    /// `value` must be less than `limit`.
    TooLarge {
        what: &'static str,
        value: u32,
        limit: u32,
    },
    /// A sequence had the wrong number of elements.
    WrongLength {
        what: &'static str,
        got: usize,
        expected: usize,
    },
}

impl RangeError {
    /// Returns `Ok(value)` when `value < limit`.
    pub fn check(what: &'static str, value: u32, limit: u32) -> Result<u32, RangeError> {
        if value < limit {
            Ok(value)
        } else {
            Err(RangeError::TooLarge { what, value, limit })
        }
    }

    /// Returns `Ok(())` when `got == expected`.
    pub fn check_len(what: &'static str, got: usize, expected: usize) -> Result<(), RangeError> {
        if got == expected {
            Ok(())
        } else {
            Err(RangeError::WrongLength {
                what,
                got,
                expected,
            })
        }
    }
}

impl Error for RangeError {}

impl Display for RangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            RangeError::TooLarge { what, value, limit } => write!(
                f,
                "{what} {value} is out of range (must be less than {limit})"
            ),
            RangeError::WrongLength {
                what,
                got,
                expected,
            } => write!(f, "{what} has {got} elements but should have {expected}"),
        }
    }
}

/// Checks that `value` fits in a 5-bit impulse mask.
pub fn check_5bit(what: &'static str, value: u8) -> Result<u8, RangeError> {
    RangeError::check(what, value.into(), 0x20).map(|_| value)
}

#[test]
fn test_check() {
    assert_eq!(RangeError::check("threshold", 16383, 16384), Ok(16383));
    assert_eq!(
        RangeError::check("threshold", 16384, 16384),
        Err(RangeError::TooLarge {
            what: "threshold",
            value: 16384,
            limit: 16384
        })
    );
    assert!(check_5bit("mask", 0x1f).is_ok());
    assert!(check_5bit("mask", 0x20).is_err());
    assert!(RangeError::check_len("pattern", 41, 41).is_ok());
    assert!(RangeError::check_len("pattern", 40, 41).is_err());
}

#[test]
fn test_display() {
    assert_eq!(
        RangeError::check("step count", 41, 41)
            .unwrap_err()
            .to_string(),
        "step count 41 is out of range (must be less than 41)"
    );
    assert_eq!(
        RangeError::check_len("cam pattern", 3, 43)
            .unwrap_err()
            .to_string(),
        "cam pattern has 3 elements but should have 43"
    );
}
