//! This crate emulates the Colossus device as seen from its command
//! bus: the tape loop, the cam wheels, the Q selector and panel, the
//! counters and comparator, and the head with its step-count vector
//! and printer.
#![crate_name = "machine"]

mod camwheel;
mod colossus;
mod comparator;
mod counters;
mod fault;
mod loopback;
mod printer;
mod qpanel;
mod repl;
mod selector;
mod stepping;
mod tape;

pub use colossus::{Colossus, MAX_RUN_SETTINGS};
pub use fault::BusFault;
pub use loopback::Loopback;
pub use repl::serve;
