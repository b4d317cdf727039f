//! An in-process transport which talks directly to an emulated
//! machine.
use std::collections::VecDeque;
use std::io;

use tracing::{Level, event};

use base::wire::{READY_MARKER, Transport};

use crate::colossus::Colossus;

/// Frames written to a `Loopback` are executed at once; the response
/// lines queue up until they are read.
#[derive(Debug)]
pub struct Loopback {
    machine: Colossus,
    pending: VecDeque<String>,
}

impl Default for Loopback {
    fn default() -> Loopback {
        Loopback::new()
    }
}

impl Loopback {
    pub fn new() -> Loopback {
        Loopback::with_machine(Colossus::new())
    }

    /// The ready banner is queued first, as a freshly started device
    /// would print it.
    pub fn with_machine(machine: Colossus) -> Loopback {
        Loopback {
            machine,
            pending: VecDeque::from([READY_MARKER.to_string()]),
        }
    }

    pub fn machine(&self) -> &Colossus {
        &self.machine
    }
}

impl Transport for Loopback {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        let line = match self.machine.execute_frame(frame) {
            Ok(response) => response.line(),
            Err(e) => {
                event!(Level::WARN, "{e}");
                e.to_string()
            }
        };
        self.pending.push_back(line);
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.pending.pop_front())
    }
}
