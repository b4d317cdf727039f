//! Worker dispatch and the schedulers in the head.
use std::fmt::{self, Display, Formatter};

use tracing::{Level, event, span};

use base::address::{self, N_BODIES, ack, sub};
use base::prelude::*;

use crate::error::Fault;
use crate::session::Colossus;

/// The jobs a body can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Worker {
    /// Copy the wheel settings into the comparator.
    CopySettings,
    /// Copy the latched counters into the comparator.
    CopyCounters,
    /// Reset the movement and the live counters, count every sprocket
    /// up to the stop letter, then latch the counters.
    RunTapeOnce,
    /// Latch the live counters and zero them.
    LatchCounters,
}

impl Worker {
    pub const fn index(&self) -> u8 {
        match self {
            Worker::CopySettings => 0,
            Worker::CopyCounters => 1,
            Worker::RunTapeOnce => 2,
            Worker::LatchCounters => 3,
        }
    }
}

impl Display for Worker {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Worker::CopySettings => "copy settings",
            Worker::CopyCounters => "copy counters",
            Worker::RunTapeOnce => "run tape once",
            Worker::LatchCounters => "latch counters",
        })
    }
}

fn check_body(body: u8) -> Result<(), Fault> {
    RangeError::check("body id", body.into(), N_BODIES.into())?;
    Ok(())
}

impl<T: Transport> Colossus<T> {
    pub fn dispatch(&mut self, worker: Worker) -> Result<(), Fault> {
        event!(Level::DEBUG, "dispatching worker: {worker}");
        self.checked(address::WORKER_DISPATCH, worker.index(), ack::CONFIG)
    }

    pub fn run_tape_once(&mut self) -> Result<(), Fault> {
        self.dispatch(Worker::RunTapeOnce)
    }

    /// Copy the step-count vector into the wheel settings of `body`.
    pub fn transfer_to_wheels(&mut self, body: u8) -> Result<(), Fault> {
        check_body(body)?;
        self.checked(address::HEAD_SCHEDULER, body, ack::CONFIG)
    }

    /// Copy the step-count vector into the wheel settings of every
    /// body.
    pub fn broadcast_to_wheels(&mut self) -> Result<(), Fault> {
        self.checked(address::HEAD_SCHEDULER, sub::BROADCAST_BODY, ack::CONFIG)
    }

    /// Print the comparator's snapshot, tagged with `body`, if the
    /// thresholds call for it.  The device reports an error if the
    /// record does not fit in its printer.
    pub fn maybe_print(&mut self, body: u8) -> Result<(), Fault> {
        check_body(body)?;
        self.checked(address::TAIL_SCHEDULER, body, ack::MAYBE_PRINT)
    }

    /// Try every setting the step-count vector generates, printing a
    /// record for each one which passes the thresholds.  Returns when
    /// the device has finished the run, or has stopped it because the
    /// printer filled up.
    pub fn initiate_run(&mut self) -> Result<(), Fault> {
        let span = span!(Level::INFO, "run");
        let _enter = span.enter();
        event!(Level::INFO, "initiating run");
        self.checked(address::HEAD_SCHEDULER, sub::INITIATE_RUN, ack::RUN_INITIATED)
    }
}
