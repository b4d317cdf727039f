//! The `base` crate defines the Colossus-related things which are
//! useful on both sides of the command bus.  The idea is that a host
//! program driving the machine and the emulation of the machine
//! itself both depend on this crate, but neither needs to depend on
//! the other.

mod error;

pub mod address;
pub mod keystream;
pub mod prelude;
pub mod print;
pub mod qpanel;
pub mod stepping;
pub mod threshold;
pub mod wheels;
pub mod wire;

pub use error::{RangeError, check_5bit};
