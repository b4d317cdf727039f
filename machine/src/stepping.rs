//! The step-count vector, which generates the succession of wheel
//! settings examined during a run.
use tracing::{Level, event};

use base::address::sub::BROADCAST_BODY;
use base::stepping::SteppingMode;
use base::wheels::{N_WHEELS, WHEEL_LENGTHS};

pub use base::address::STEP_COUNT_FRAME_LEN as FRAME_LEN;
const FRAME_PREAMBLE: u8 = 0x2d;

#[derive(Debug, Clone, Default)]
pub struct StepCountVector {
    modes: [SteppingMode; N_WHEELS],
    counts: [usize; N_WHEELS],
}

impl StepCountVector {
    pub fn configure(&mut self, wheel: usize, mode: SteppingMode) {
        event!(Level::DEBUG, "wheel {wheel} stepping mode is now {mode}");
        self.modes[wheel] = mode;
    }

    pub fn reset(&mut self) {
        self.counts = [0; N_WHEELS];
    }

    pub fn counts(&self) -> &[usize; N_WHEELS] {
        &self.counts
    }

    /// Apply one "next" pulse.
    pub fn next(&mut self) {
        let before = self.counts;
        let mut after = before;
        let mut triggered = false;
        for (i, mode) in self.modes.iter().enumerate() {
            if mode.fast {
                after[i] = (before[i] + 1) % WHEEL_LENGTHS[i];
                if mode.trigger && after[i] == 0 {
                    triggered = true;
                }
            }
        }
        if triggered {
            for (i, mode) in self.modes.iter().enumerate() {
                if mode.slow {
                    after[i] = (after[i] + 1) % WHEEL_LENGTHS[i];
                }
            }
        }
        event!(
            Level::TRACE,
            "step-count vector {before:?} -> {after:?} (triggered: {triggered})"
        );
        self.counts = after;
    }

    /// True when every wheel which is not ignored on completion is back
    /// at count 0.
    pub fn ended(&self) -> bool {
        self.modes
            .iter()
            .zip(self.counts.iter())
            .all(|(mode, &count)| mode.ignore_on_completion || count == 0)
    }

    /// The command-bus frame which transfers the counts to every body.
    pub fn frame(&self) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[1] = FRAME_PREAMBLE;
        frame[2] = BROADCAST_BODY;
        for (slot, &count) in frame[3..3 + N_WHEELS].iter_mut().zip(self.counts.iter()) {
            // Every wheel has fewer than 256 cams.
            *slot = count as u8;
        }
        frame
    }
}
