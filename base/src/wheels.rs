//! The twelve cam wheels.
//!
//! The wheels fall into three groups.  The five chi wheels always
//! step together.  The two mu ("motor") wheels control whether the
//! five psi wheels move.  Wheel indexes run chi 0-4, psi 5-9, mu
//! 10-11, and this is the order in which they appear everywhere on
//! the bus (step-count vector, comparator settings, print records).
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::error::RangeError;

pub const N_WHEELS: usize = 12;
pub const N_COUNTERS: usize = 5;

pub const CHI_LENGTHS: [usize; 5] = [41, 31, 29, 26, 23];
pub const PSI_LENGTHS: [usize; 5] = [43, 47, 51, 53, 59];
pub const MU_LENGTHS: [usize; 2] = [61, 37];

/// Number of cams on each wheel, in bus order.
pub const WHEEL_LENGTHS: [usize; N_WHEELS] = [
    41, 31, 29, 26, 23, // chi
    43, 47, 51, 53, 59, // psi
    61, 37, // mu
];

const FIRST_PSI: usize = 5;
const FIRST_MU: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WheelGroup {
    Chi,
    Psi,
    Mu,
}

/// Identifies one of the twelve wheels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Wheel(usize);

impl Wheel {
    pub fn new(index: usize) -> Result<Wheel, RangeError> {
        RangeError::check("wheel index", index as u32, N_WHEELS as u32)?;
        Ok(Wheel(index))
    }

    /// Chi wheel `i` (0-based, so `chi(0)` is the wheel usually called χ1).
    pub fn chi(i: usize) -> Result<Wheel, RangeError> {
        RangeError::check("chi wheel index", i as u32, CHI_LENGTHS.len() as u32)?;
        Ok(Wheel(i))
    }

    pub fn psi(i: usize) -> Result<Wheel, RangeError> {
        RangeError::check("psi wheel index", i as u32, PSI_LENGTHS.len() as u32)?;
        Ok(Wheel(FIRST_PSI + i))
    }

    pub fn mu(i: usize) -> Result<Wheel, RangeError> {
        RangeError::check("mu wheel index", i as u32, MU_LENGTHS.len() as u32)?;
        Ok(Wheel(FIRST_MU + i))
    }

    /// Every wheel, in bus order.
    #[must_use]
    pub fn all() -> [Wheel; N_WHEELS] {
        std::array::from_fn(Wheel)
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }

    /// Number of cams on this wheel.
    #[must_use]
    pub const fn length(&self) -> usize {
        WHEEL_LENGTHS[self.0]
    }

    #[must_use]
    pub const fn group(&self) -> WheelGroup {
        if self.0 < FIRST_PSI {
            WheelGroup::Chi
        } else if self.0 < FIRST_MU {
            WheelGroup::Psi
        } else {
            WheelGroup::Mu
        }
    }
}

impl TryFrom<usize> for Wheel {
    type Error = RangeError;
    fn try_from(index: usize) -> Result<Wheel, RangeError> {
        Wheel::new(index)
    }
}

impl Display for Wheel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self.group() {
            WheelGroup::Chi => write!(f, "chi-{}", self.0 + 1),
            WheelGroup::Psi => write!(f, "psi-{}", self.0 - FIRST_PSI + 1),
            WheelGroup::Mu => write!(f, "mu-{}", MU_LENGTHS[self.0 - FIRST_MU]),
        }
    }
}

/// The cam pattern of a wheel; `true` is a raised cam.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CamPattern(Vec<bool>);

impl CamPattern {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, i: usize) -> Option<bool> {
        self.0.get(i).copied()
    }

    #[must_use]
    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    /// The cam at position `i`, counting cyclically.  An empty pattern
    /// has no cams at all.
    #[must_use]
    pub fn cyclic(&self, i: usize) -> Option<bool> {
        if self.0.is_empty() {
            None
        } else {
            self.get(i % self.0.len())
        }
    }

    /// Rotate left by `n`: element 0 of the result is element `n` of
    /// `self`.
    #[must_use]
    pub fn rotated_left(&self, n: usize) -> CamPattern {
        let mut bits = self.0.clone();
        if !bits.is_empty() {
            bits.rotate_left(n % self.0.len());
        }
        CamPattern(bits)
    }

    /// Checks that this pattern has the right number of cams for `wheel`.
    pub fn check_fits(&self, wheel: Wheel) -> Result<(), RangeError> {
        RangeError::check_len("cam pattern", self.len(), wheel.length())
    }

    /// The octets written, in order, to load this pattern into a
    /// wheel.
    ///
    /// The pattern is reversed and zero-padded at the most
    /// significant end to a whole number of octets; each octet is
    /// then taken most-significant bit first.  Equivalently, cam `k`
    /// is bit `k` of a big-endian integer of that width.
    #[must_use]
    pub fn load_octets(&self) -> Vec<u8> {
        let n_octets = self.0.len().div_ceil(8);
        (0..n_octets)
            .rev()
            .map(|octet| {
                (0..8).fold(0u8, |acc, bit| {
                    let cam = octet * 8 + bit;
                    if self.0.get(cam).copied().unwrap_or(false) {
                        acc | (1 << bit)
                    } else {
                        acc
                    }
                })
            })
            .collect()
    }
}

impl From<Vec<bool>> for CamPattern {
    fn from(bits: Vec<bool>) -> CamPattern {
        CamPattern(bits)
    }
}

impl FromIterator<bool> for CamPattern {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> CamPattern {
        CamPattern(iter.into_iter().collect())
    }
}
