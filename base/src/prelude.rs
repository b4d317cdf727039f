//! The prelude exports the types which describe the machine's
//! configuration and the bus protocol.  Providing this prelude is the
//! main purpose of the base crate.
pub use super::error::RangeError;
pub use super::print::{PrintRecord, TruncatedRecord};
pub use super::qpanel::{QPanelBottomUnitConfig, QPanelNegatingConfig, QPanelTopUnitConfig};
pub use super::stepping::SteppingMode;
pub use super::threshold::{ThresholdConfig, ThresholdOperation};
pub use super::wheels::{CamPattern, N_COUNTERS, N_WHEELS, WHEEL_LENGTHS, Wheel, WheelGroup};
pub use super::wire::{Command, Response, Transport, WireError};
