//! The cam wheels and the step-count vector.
use tracing::{Level, event, span};

use base::address::{self, STEP_COUNT_FRAME_LEN, ack, sub};
use base::prelude::*;

use crate::error::Fault;
use crate::session::Colossus;

impl<T: Transport> Colossus<T> {
    /// Load `pattern` into `wheel`, one octet at a time.
    pub fn load_pattern(&mut self, wheel: Wheel, pattern: &CamPattern) -> Result<(), Fault> {
        pattern.check_fits(wheel)?;
        event!(Level::DEBUG, "loading pattern of {wheel}");
        let addr = address::cam_wheel_pattern(wheel.index());
        for chunk in pattern.load_octets() {
            self.checked(addr, chunk, ack::WHEEL_LOAD)?;
        }
        Ok(())
    }

    /// Set the wheel's step count (its setting).
    pub fn set_offset(&mut self, wheel: Wheel, n: usize) -> Result<(), Fault> {
        RangeError::check("step count", n as u32, wheel.length() as u32)?;
        // Every wheel has fewer than 0x40 cams.
        self.checked(
            address::cam_wheel_control(wheel.index()),
            n as u8,
            ack::WHEEL_SET_STEP_COUNT,
        )
    }

    pub fn read_offset(&mut self, wheel: Wheel) -> Result<usize, Fault> {
        let n = self.value(
            address::cam_wheel_control(wheel.index()),
            sub::WHEEL_READ_STEP_COUNT,
        )?;
        Ok(n.into())
    }

    pub fn reset_wheel_movement(&mut self, wheel: Wheel) -> Result<(), Fault> {
        self.checked(
            address::cam_wheel_control(wheel.index()),
            sub::WHEEL_RESET_MOVEMENT,
            ack::WHEEL_RESET_MOVEMENT,
        )
    }

    pub fn move_wheel_one_shot(&mut self, wheel: Wheel) -> Result<(), Fault> {
        self.checked(
            address::cam_wheel_control(wheel.index()),
            sub::WHEEL_MOVE_ONE_SHOT,
            ack::WHEEL_MOVE_ONE_SHOT,
        )
    }

    /// The cam under the wheel's read head.
    pub fn read_head(&mut self, wheel: Wheel) -> Result<bool, Fault> {
        let cam = self.value(address::cam_wheel_control(wheel.index()), sub::WHEEL_READ_HEAD)?;
        Ok(cam != 0)
    }

    /// Read the whole pattern as it passes the head, starting from
    /// setting `offset`.  The result is the loaded pattern rotated
    /// left by `offset`.
    pub fn read_pattern_at_offset(
        &mut self,
        wheel: Wheel,
        offset: usize,
    ) -> Result<CamPattern, Fault> {
        self.set_offset(wheel, offset)?;
        self.reset_wheel_movement(wheel)?;
        (0..wheel.length())
            .map(|_| {
                let cam = self.read_head(wheel)?;
                self.move_wheel_one_shot(wheel)?;
                Ok(cam)
            })
            .collect()
    }

    /// Set every wheel's step count to zero.
    pub fn reset_all_stepping(&mut self) -> Result<(), Fault> {
        for wheel in Wheel::all() {
            self.set_offset(wheel, 0)?;
        }
        Ok(())
    }

    pub fn set_stepping_mode(&mut self, wheel: Wheel, mode: SteppingMode) -> Result<(), Fault> {
        self.checked(
            address::step_count_config(wheel.index()),
            mode.nibble(),
            ack::CONFIG,
        )
    }

    pub fn reset_all_step_count_vector_configs(&mut self) -> Result<(), Fault> {
        for wheel in Wheel::all() {
            self.set_stepping_mode(wheel, SteppingMode::NONE)?;
        }
        Ok(())
    }

    pub fn reset_step_count_vector(&mut self) -> Result<(), Fault> {
        self.checked(address::STEP_COUNT_VECTOR, sub::VECTOR_RESET, ack::VECTOR_RESET)
    }

    pub fn next_step_count_vector(&mut self) -> Result<(), Fault> {
        self.checked(address::STEP_COUNT_VECTOR, sub::VECTOR_NEXT, ack::VECTOR_NEXT)
    }

    pub fn read_step_count_vector(&mut self) -> Result<[usize; N_WHEELS], Fault> {
        let mut counts = [0usize; N_WHEELS];
        for (i, count) in (0u8..).zip(counts.iter_mut()) {
            *count = self.value(address::STEP_COUNT_VECTOR, i)?.into();
        }
        Ok(counts)
    }

    /// Read the counts, then pulse the vector once.
    pub fn read_step_count_vector_then_step(&mut self) -> Result<[usize; N_WHEELS], Fault> {
        let counts = self.read_step_count_vector()?;
        self.next_step_count_vector()?;
        Ok(counts)
    }

    pub fn step_count_vector_ended(&mut self) -> Result<bool, Fault> {
        Ok(self.value(address::STEP_COUNT_VECTOR, sub::VECTOR_ENDED)? != 0)
    }

    /// The command-bus frame the vector currently emits.
    pub fn step_count_vector_frame(&mut self) -> Result<[u8; STEP_COUNT_FRAME_LEN], Fault> {
        let mut frame = [0u8; STEP_COUNT_FRAME_LEN];
        for (i, octet) in (0u8..).zip(frame.iter_mut()) {
            *octet = self.value(address::STEP_COUNT_VECTOR, sub::VECTOR_FRAME + i)?;
        }
        Ok(frame)
    }

    /// Put arbitrary counts into the step-count vector by pulsing each
    /// wheel on its own.  Leaves every wheel's stepping mode cleared.
    pub fn broadcast_targets(&mut self, targets: &[usize; N_WHEELS]) -> Result<(), Fault> {
        for (wheel, &target) in Wheel::all().iter().zip(targets.iter()) {
            RangeError::check("step count target", target as u32, wheel.length() as u32)?;
        }
        let span = span!(Level::DEBUG, "broadcast_targets", ?targets);
        let _enter = span.enter();
        self.reset_all_step_count_vector_configs()?;
        self.reset_step_count_vector()?;
        for (wheel, &target) in Wheel::all().iter().zip(targets.iter()) {
            self.set_stepping_mode(*wheel, SteppingMode::FAST)?;
            for _ in 0..target {
                self.next_step_count_vector()?;
            }
            self.set_stepping_mode(*wheel, SteppingMode::NONE)?;
        }
        Ok(())
    }
}
