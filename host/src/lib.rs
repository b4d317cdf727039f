//! Host-side control of a Colossus over its command bus.
//!
//! A [`Colossus`] session owns a [`Channel`], which in turn owns a
//! [`Transport`](base::wire::Transport).  Each session operation
//! sends one or more commands, checks each acknowledgement, and
//! decodes what comes back.
#![crate_name = "host"]

mod channel;
mod combining;
mod counters;
mod error;
mod session;
mod tape;
mod wheels;
mod workers;

pub use channel::{Channel, StreamTransport};
pub use combining::{SnoopTarget, selector};
pub use error::{DeviceFault, Fault, ProtocolFault};
pub use session::Colossus;
pub use tape::STOP_LETTER;
pub use workers::Worker;
