//! The machine as seen from the command bus.
//!
//! Addresses below [`HEAD_SPACE_START`] belong to the body: tape,
//! wheels, selector, Q panel, counters and comparator.  The remaining
//! addresses belong to the head, which holds the step-count vector,
//! the schedulers and the printer.
//!
//! The emulation has a single body's worth of hardware.  Lane (body)
//! numbers given to the schedulers are checked, and are used to tag
//! print records, but every lane drives the same units.
use std::fmt::{self, Debug, Formatter};

use tracing::{Level, event, span};

use base::address::{self, HEAD_SPACE_START, N_BODIES, ack, sub};
use base::keystream::letter_from_impulses;
use base::stepping::SteppingMode;
use base::wheels::{N_COUNTERS, N_WHEELS, Wheel};
use base::wire::{Command, Response, WireError};

use crate::camwheel::CamWheel;
use crate::comparator::Comparator;
use crate::counters::Counters;
use crate::fault::BusFault;
use crate::printer::Printer;
use crate::qpanel::QPanel;
use crate::selector::{Letters, QSelector};
use crate::stepping::{FRAME_LEN, StepCountVector};
use crate::tape::{self, Tape};

#[cfg(test)]
mod tests;

/// A run stops after this many settings even if the step-count
/// vector has not come back round.
pub const MAX_RUN_SETTINGS: usize = 1 << 24;

const MU_61: usize = 10;
const MU_37: usize = 11;

/// Worker numbers understood at [`address::WORKER_DISPATCH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Worker {
    CopySettings,
    CopyCounters,
    RunTapeOnce,
    LatchCounters,
}

impl TryFrom<u8> for Worker {
    type Error = ();
    fn try_from(n: u8) -> Result<Worker, ()> {
        match n {
            0 => Ok(Worker::CopySettings),
            1 => Ok(Worker::CopyCounters),
            2 => Ok(Worker::RunTapeOnce),
            3 => Ok(Worker::LatchCounters),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Movement {
    /// Tape position under the read head.
    sprocket: usize,
    /// Letters seen at the previous sprocket (all zero just after a
    /// reset).
    previous: Letters,
    since_reset: usize,
}

pub struct Colossus {
    latched_address: Option<u8>,
    tape: Tape,
    wheels: [CamWheel; N_WHEELS],
    movement: Movement,
    selector: QSelector,
    panel: QPanel,
    counters: Counters,
    comparator: Comparator,
    vector: StepCountVector,
    printer: Printer,
    run_limit: usize,
}

impl Debug for Colossus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("Colossus")
            .field("latched_address", &self.latched_address)
            .field("movement", &self.movement)
            .field("selector", &self.selector)
            .field("vector", &self.vector)
            .field("printer_len", &self.printer.len())
            .finish_non_exhaustive()
    }
}

impl Default for Colossus {
    fn default() -> Colossus {
        Colossus::new()
    }
}

fn bad_data(address: u8, data: u8) -> BusFault {
    BusFault::BadData { address, data }
}

/// Turn a unit's acceptance of a write into an acknowledgement.
fn accepted(ok: bool, address: u8, data: u8, ack_code: u8) -> Result<u8, BusFault> {
    if ok {
        Ok(ack_code)
    } else {
        Err(bad_data(address, data))
    }
}

impl Colossus {
    pub fn new() -> Colossus {
        Colossus {
            latched_address: None,
            tape: Tape::new(),
            wheels: Wheel::all().map(CamWheel::new),
            movement: Movement::default(),
            selector: QSelector::default(),
            panel: QPanel::default(),
            counters: Counters::default(),
            comparator: Comparator::default(),
            vector: StepCountVector::default(),
            printer: Printer::default(),
            run_limit: MAX_RUN_SETTINGS,
        }
    }

    /// A machine whose runs give up after `limit` settings rather than
    /// [`MAX_RUN_SETTINGS`].
    pub fn with_run_limit(limit: usize) -> Colossus {
        Colossus {
            run_limit: limit,
            ..Colossus::new()
        }
    }

    /// Carry out one bus command.
    pub fn execute(&mut self, command: &Command) -> Response {
        let outcome = match command.data {
            Some(data) => {
                self.latched_address = Some(command.address);
                self.write(command.address, data)
            }
            None => match self.latched_address {
                Some(address) => self.write(address, command.address),
                None => Err(BusFault::NoLatchedAddress),
            },
        };
        match outcome {
            Ok(value) => {
                event!(Level::TRACE, "{command} -> {value:#04x}");
                Response::ok(*command, value)
            }
            Err(fault) => {
                event!(Level::WARN, "{command} failed: {fault}");
                Response::error(*command, fault.code())
            }
        }
    }

    /// Parse and carry out one command frame.
    pub fn execute_frame(&mut self, frame: &str) -> Result<Response, WireError> {
        let command = Command::parse_frame(frame)?;
        Ok(self.execute(&command))
    }

    fn write(&mut self, address: u8, data: u8) -> Result<u8, BusFault> {
        if address >= HEAD_SPACE_START {
            self.write_head(address, data)
        } else {
            self.write_body(address, data)
        }
    }

    fn write_body(&mut self, addr: u8, data: u8) -> Result<u8, BusFault> {
        use address::*;
        match addr {
            NIBBLE_ADDER => Ok(((data & 0x0f) + (data >> 4)) & 0x0f),
            COUNTERS => self.counters_command(data),
            Q_SELECTOR_CONTROL => match data {
                sub::Q_SELECTOR_RESET => {
                    self.selector.reset();
                    Ok(ack::Q_SELECTOR_RESET)
                }
                sub::Q_SELECTOR_ONE_SHOT => {
                    self.refresh_q();
                    Ok(ack::Q_SELECTOR_ONE_SHOT)
                }
                _ => Err(bad_data(addr, data)),
            },
            Q_SELECTOR_CONFIG => accepted(self.selector.configure(data), addr, data, ack::CONFIG),
            MOVEMENT => match data {
                sub::MOVEMENT_RESET => {
                    self.reset_movement();
                    Ok(ack::MOVEMENT_RESET)
                }
                sub::MOVEMENT_MOVE => {
                    self.move_one_sprocket();
                    Ok(ack::MOVEMENT_MOVE)
                }
                _ => Err(bad_data(addr, data)),
            },
            SNOOP => self.snoop(data),
            TAPE_CLEAR if data == 0 => {
                self.tape.clear();
                Ok(ack::TAPE_CLEAR)
            }
            TAPE_READ => match data {
                sub::TAPE_REWIND => {
                    self.tape.rewind();
                    Ok(ack::TAPE_REWIND)
                }
                sub::TAPE_READ_ADVANCE => Ok(self.tape.read_and_advance()),
                _ => Err(bad_data(addr, data)),
            },
            TAPE_WRITE_RESET if data == 0 => {
                self.tape.reset_write_pointer();
                Ok(ack::TAPE_WRITE_RESET)
            }
            TAPE_PUNCH => {
                self.tape.punch(data)?;
                Ok(ack::TAPE_PUNCH)
            }
            TAPE_CLEAR | TAPE_WRITE_RESET => Err(bad_data(addr, data)),
            a if (Q_PANEL_TOP_BASE..Q_PANEL_BOTTOM_BASE).contains(&a) => {
                let offset = usize::from(a - Q_PANEL_TOP_BASE);
                let ok = self.panel.write_top(offset / 3, offset % 3, data);
                accepted(ok, addr, data, ack::CONFIG)
            }
            a if (Q_PANEL_BOTTOM_BASE..Q_PANEL_NEGATING_BASE).contains(&a) => {
                let offset = usize::from(a - Q_PANEL_BOTTOM_BASE);
                let ok = self.panel.write_bottom(offset / 2, offset % 2, data);
                accepted(ok, addr, data, ack::CONFIG)
            }
            a if (Q_PANEL_NEGATING_BASE..Q_PANEL_NEGATING_BASE + 2).contains(&a) => {
                let ok = self
                    .panel
                    .write_negating(usize::from(a - Q_PANEL_NEGATING_BASE), data);
                accepted(ok, addr, data, ack::CONFIG)
            }
            COMPARATOR => self.comparator_read(data),
            a if (THRESHOLD_BASE..threshold(N_COUNTERS, 0)).contains(&a) => {
                let offset = usize::from(a - THRESHOLD_BASE);
                let ok = self
                    .comparator
                    .write_threshold(offset / 2, offset % 2, data);
                accepted(ok, addr, data, ack::CONFIG)
            }
            WORKER_DISPATCH => {
                let worker = Worker::try_from(data).map_err(|()| bad_data(addr, data))?;
                self.dispatch(worker);
                Ok(ack::CONFIG)
            }
            a if (CAM_WHEEL_BASE..CAM_WHEEL_END).contains(&a) => {
                let offset = usize::from(a - CAM_WHEEL_BASE);
                let wheel = offset / 2;
                if offset % 2 == 0 {
                    self.wheels[wheel].load_chunk(data);
                    Ok(ack::WHEEL_LOAD)
                } else {
                    self.wheel_control(wheel, addr, data)
                }
            }
            _ => Err(BusFault::UnknownBodyAddress(addr)),
        }
    }

    fn write_head(&mut self, addr: u8, data: u8) -> Result<u8, BusFault> {
        use address::*;
        match addr {
            a if (STEP_COUNT_CONFIG_BASE..STEP_COUNT_VECTOR).contains(&a) => {
                let mode = SteppingMode::try_from(data).map_err(|_| bad_data(addr, data))?;
                self.vector
                    .configure(usize::from(a - STEP_COUNT_CONFIG_BASE), mode);
                Ok(ack::CONFIG)
            }
            STEP_COUNT_VECTOR => self.vector_command(data),
            HEAD_SCHEDULER => match data {
                sub::INITIATE_RUN => {
                    self.initiate_run()?;
                    Ok(ack::RUN_INITIATED)
                }
                body if body < N_BODIES || body == sub::BROADCAST_BODY => {
                    self.transfer_to_wheels(body);
                    Ok(ack::CONFIG)
                }
                _ => Err(bad_data(addr, data)),
            },
            TAIL_SCHEDULER if data < N_BODIES => {
                self.maybe_print(data)?;
                Ok(ack::MAYBE_PRINT)
            }
            TAIL_SCHEDULER => Err(bad_data(addr, data)),
            PRINTER_READ => {
                let [lsb, msb] = u16::try_from(self.printer.len())
                    .unwrap_or(u16::MAX)
                    .to_le_bytes();
                match data {
                    sub::PRINTER_LENGTH_LSB => Ok(lsb),
                    sub::PRINTER_LENGTH_MSB => Ok(msb),
                    sub::PRINTER_REWIND => {
                        self.printer.rewind();
                        Ok(ack::PRINTER_REWIND)
                    }
                    sub::PRINTER_READ_NEXT => {
                        self.printer.read_next().ok_or(bad_data(addr, data))
                    }
                    _ => Err(bad_data(addr, data)),
                }
            }
            PRINTER_RESET if data == 0 => {
                self.printer.reset();
                Ok(ack::PRINTER_RESET)
            }
            PRINTER_RESET => Err(bad_data(addr, data)),
            PRINTER_WRITE => {
                if self.printer.write(&[data]) {
                    Ok(ack::CONFIG)
                } else {
                    Err(BusFault::PrinterFull { address: addr })
                }
            }
            _ => Err(BusFault::UnknownHeadAddress(addr)),
        }
    }

    fn counters_command(&mut self, data: u8) -> Result<u8, BusFault> {
        let latched = *self.counters.latched();
        match data {
            sub::COUNTERS_RESET => {
                self.counters.reset_live();
                Ok(ack::COUNTERS_RESET)
            }
            sub::COUNTERS_COUNT_ONE_SHOT => {
                self.count_sprocket();
                Ok(ack::COUNTERS_COUNT_ONE_SHOT)
            }
            sub::COUNTERS_LATCH => {
                self.counters.latch();
                Ok(ack::COUNTERS_LATCH)
            }
            i if usize::from(i) < N_COUNTERS => Ok(latched[usize::from(i)].to_le_bytes()[0]),
            i if (sub::COUNTER_MSB..sub::COUNTER_MSB + N_COUNTERS as u8).contains(&i) => {
                Ok(latched[usize::from(i - sub::COUNTER_MSB)].to_le_bytes()[1])
            }
            _ => Err(bad_data(address::COUNTERS, data)),
        }
    }

    fn comparator_read(&self, data: u8) -> Result<u8, BusFault> {
        let c = &self.comparator;
        let n_counters = N_COUNTERS as u8;
        match data {
            i if usize::from(i) < N_WHEELS => Ok(c.settings()[usize::from(i)]),
            i if (sub::COMPARATOR_COUNTER_LSB..sub::COMPARATOR_COUNTER_LSB + n_counters)
                .contains(&i) =>
            {
                Ok(c.counters()[usize::from(i - sub::COMPARATOR_COUNTER_LSB)].to_le_bytes()[0])
            }
            i if (sub::COMPARATOR_COUNTER_MSB..sub::COMPARATOR_COUNTER_MSB + n_counters)
                .contains(&i) =>
            {
                Ok(c.counters()[usize::from(i - sub::COMPARATOR_COUNTER_MSB)].to_le_bytes()[1])
            }
            sub::COMPARATOR_GT_VECTOR => Ok(c.gt_vector()),
            sub::COMPARATOR_LT_VECTOR => Ok(c.lt_vector()),
            sub::COMPARATOR_PRINT_VECTOR => Ok(c.print_required_vector()),
            sub::COMPARATOR_PRINT_REQUIRED => Ok(u8::from(c.print_required())),
            _ => Err(bad_data(address::COMPARATOR, data)),
        }
    }

    fn wheel_control(&mut self, wheel: usize, addr: u8, data: u8) -> Result<u8, BusFault> {
        let w = &mut self.wheels[wheel];
        match data {
            n if n < sub::WHEEL_STEP_COUNT_LIMIT => accepted(
                w.set_step_count(usize::from(n)),
                addr,
                data,
                ack::WHEEL_SET_STEP_COUNT,
            ),
            sub::WHEEL_RESET_MOVEMENT => {
                w.reset_movement();
                Ok(ack::WHEEL_RESET_MOVEMENT)
            }
            sub::WHEEL_MOVE_ONE_SHOT => {
                w.advance();
                Ok(ack::WHEEL_MOVE_ONE_SHOT)
            }
            // Every wheel has fewer than 256 cams.
            sub::WHEEL_READ_STEP_COUNT => Ok(w.step_count() as u8),
            sub::WHEEL_READ_HEAD => Ok(u8::from(w.head())),
            _ => Err(bad_data(addr, data)),
        }
    }

    fn vector_command(&mut self, data: u8) -> Result<u8, BusFault> {
        let frame_end = sub::VECTOR_FRAME + FRAME_LEN as u8;
        match data {
            i if usize::from(i) < N_WHEELS => Ok(self.vector.counts()[usize::from(i)] as u8),
            sub::VECTOR_ENDED => Ok(u8::from(self.vector.ended())),
            sub::VECTOR_RESET => {
                self.vector.reset();
                Ok(ack::VECTOR_RESET)
            }
            sub::VECTOR_NEXT => {
                self.vector.next();
                Ok(ack::VECTOR_NEXT)
            }
            i if (sub::VECTOR_FRAME..frame_end).contains(&i) => {
                Ok(self.vector.frame()[usize::from(i - sub::VECTOR_FRAME)])
            }
            _ => Err(bad_data(address::STEP_COUNT_VECTOR, data)),
        }
    }

    fn snoop(&self, data: u8) -> Result<u8, BusFault> {
        let letters = self.letters();
        match data {
            sub::SNOOP_Z => Ok(tape::snooped(self.tape.at(self.movement.sprocket))),
            sub::SNOOP_Q => Ok(self.selector.q()),
            sub::SNOOP_CHI => Ok(letters.chi),
            sub::SNOOP_PSI => Ok(letters.psi),
            sub::SNOOP_MOTOR => Ok(u8::from(self.wheels[MU_61].head()) << 1
                | u8::from(self.wheels[MU_37].head())),
            sub::SNOOP_A => Ok(self.panel.counter_mask(self.selector.q())),
            _ => Err(bad_data(address::SNOOP, data)),
        }
    }

    fn group_letter(&self, first: usize) -> u8 {
        letter_from_impulses([
            self.wheels[first].head(),
            self.wheels[first + 1].head(),
            self.wheels[first + 2].head(),
            self.wheels[first + 3].head(),
            self.wheels[first + 4].head(),
        ])
    }

    fn letters(&self) -> Letters {
        Letters {
            z: self.tape.at(self.movement.sprocket) & tape::LETTER_MASK,
            chi: self.group_letter(0),
            psi: self.group_letter(5),
        }
    }

    fn refresh_q(&mut self) {
        let current = self.letters();
        self.selector.refresh(&current, &self.movement.previous);
    }

    fn reset_movement(&mut self) {
        self.movement = Movement::default();
        for wheel in self.wheels.iter_mut() {
            wheel.reset_movement();
        }
        self.refresh_q();
    }

    fn move_one_sprocket(&mut self) {
        let before = self.letters();
        if self.movement.sprocket < tape::CAPACITY {
            self.movement.sprocket += 1;
        }
        for chi in self.wheels[..5].iter_mut() {
            chi.advance();
        }
        let mu37_raised = self.wheels[MU_37].head();
        let mu61_raised = self.wheels[MU_61].head();
        if mu37_raised {
            for psi in self.wheels[5..10].iter_mut() {
                psi.advance();
            }
        }
        if mu61_raised {
            self.wheels[MU_37].advance();
        }
        self.wheels[MU_61].advance();
        self.movement.previous = before;
        self.movement.since_reset += 1;
        self.refresh_q();
    }

    fn count_sprocket(&mut self) {
        if self.selector.uses_delta() && self.movement.since_reset == 0 {
            // No previous letter to difference against yet.
            return;
        }
        let mask = self.panel.counter_mask(self.selector.q());
        self.counters.count(mask);
    }

    fn run_tape_once(&mut self) {
        self.reset_movement();
        self.counters.reset_live();
        while !tape::is_stop(self.tape.at(self.movement.sprocket)) {
            self.count_sprocket();
            self.move_one_sprocket();
        }
        self.counters.latch();
        event!(
            Level::DEBUG,
            "tape pass over {} sprockets gave counts {:?}",
            self.movement.sprocket,
            self.counters.latched()
        );
    }

    fn dispatch(&mut self, worker: Worker) {
        event!(Level::DEBUG, "dispatching worker {worker:?}");
        match worker {
            Worker::CopySettings => {
                let settings: [u8; N_WHEELS] =
                    std::array::from_fn(|i| self.wheels[i].step_count() as u8);
                self.comparator.set_settings(settings);
            }
            Worker::CopyCounters => self.comparator.set_counters(*self.counters.latched()),
            Worker::RunTapeOnce => self.run_tape_once(),
            Worker::LatchCounters => self.counters.latch_and_clear(),
        }
    }

    fn transfer_to_wheels(&mut self, body: u8) {
        event!(
            Level::DEBUG,
            "transferring step counts {:?} to body {body}",
            self.vector.counts()
        );
        for (wheel, &count) in self.wheels.iter_mut().zip(self.vector.counts().iter()) {
            // Vector counts are always less than the wheel length.
            wheel.set_step_count(count);
        }
    }

    fn maybe_print(&mut self, body: u8) -> Result<(), BusFault> {
        if let Some(record) = self.comparator.maybe_record(body) {
            event!(Level::DEBUG, "printing {record:?}");
            if !self.printer.write(&record.to_octets()) {
                return Err(BusFault::PrinterFull {
                    address: address::TAIL_SCHEDULER,
                });
            }
        }
        Ok(())
    }

    /// Step through every setting of the step-count vector, printing
    /// those that pass the thresholds.  The run stops early, with an
    /// error, if a print record does not fit in the printer.
    fn initiate_run(&mut self) -> Result<(), BusFault> {
        let span = span!(Level::INFO, "run");
        let _enter = span.enter();
        event!(Level::INFO, "starting run");
        self.vector.reset();
        let mut lane: u8 = 1;
        let mut settings_tried: usize = 0;
        loop {
            self.transfer_to_wheels(lane);
            self.run_tape_once();
            self.dispatch(Worker::CopySettings);
            self.dispatch(Worker::CopyCounters);
            if let Err(e) = self.maybe_print(lane) {
                event!(
                    Level::WARN,
                    "stopping run at setting {settings_tried}: {e}"
                );
                return Err(e);
            }
            self.vector.next();
            settings_tried += 1;
            lane = (lane + 1) % N_BODIES;
            if self.vector.ended() {
                break;
            }
            if settings_tried >= self.run_limit {
                event!(
                    Level::WARN,
                    "abandoning run after {settings_tried} settings"
                );
                break;
            }
        }
        event!(
            Level::INFO,
            "run finished after {settings_tried} settings; printer holds {} octets",
            self.printer.len()
        );
        Ok(())
    }
}
