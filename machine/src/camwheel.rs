//! A single cam wheel.
//!
//! The pattern is held in a shift register as wide as the wheel has
//! cams.  Loading shifts each octet in at the least significant end,
//! so after a full load cam `k` is bit `k` of the register.
//!
//! The read head sees cam `(step_count + movement) mod length`.  The
//! step count is the wheel's setting; the movement counts sprockets
//! since the last movement reset.
use tracing::{Level, event};

use base::wheels::Wheel;

#[derive(Debug, Clone)]
pub struct CamWheel {
    wheel: Wheel,
    pattern: u64,
    step_count: usize,
    movement: usize,
}

impl CamWheel {
    pub fn new(wheel: Wheel) -> CamWheel {
        CamWheel {
            wheel,
            pattern: 0,
            step_count: 0,
            movement: 0,
        }
    }

    pub fn length(&self) -> usize {
        self.wheel.length()
    }

    fn mask(&self) -> u64 {
        (1u64 << self.length()) - 1
    }

    pub fn load_chunk(&mut self, chunk: u8) {
        self.pattern = ((self.pattern << 8) | u64::from(chunk)) & self.mask();
        event!(
            Level::TRACE,
            "{}: pattern register now {:#x}",
            self.wheel,
            self.pattern
        );
    }

    pub fn cam(&self, k: usize) -> bool {
        (self.pattern >> (k % self.length())) & 1 != 0
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns `false` (and changes nothing) if `n` is not a valid
    /// setting for this wheel.
    pub fn set_step_count(&mut self, n: usize) -> bool {
        if n < self.length() {
            self.step_count = n;
            true
        } else {
            event!(
                Level::WARN,
                "{}: step count {n} is not less than the wheel length {}",
                self.wheel,
                self.length()
            );
            false
        }
    }

    pub fn reset_movement(&mut self) {
        self.movement = 0;
    }

    pub fn advance(&mut self) {
        self.movement = (self.movement + 1) % self.length();
    }

    /// Position of the cam under the read head.
    pub fn head_position(&self) -> usize {
        (self.step_count + self.movement) % self.length()
    }

    pub fn head(&self) -> bool {
        self.cam(self.head_position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base::wheels::CamPattern;

    fn load(wheel: &mut CamWheel, pattern: &CamPattern) {
        for chunk in pattern.load_octets() {
            wheel.load_chunk(chunk);
        }
    }

    #[test]
    fn test_load_puts_cam_k_at_bit_k() {
        let w = Wheel::psi(0).unwrap();
        let pattern: CamPattern = (0..43).map(|k| k % 3 == 0 || k == 42).collect();
        let mut wheel = CamWheel::new(w);
        load(&mut wheel, &pattern);
        for k in 0..43 {
            assert_eq!(Some(wheel.cam(k)), pattern.cyclic(k), "cam {k}");
        }
    }

    #[test]
    fn test_reload_replaces_pattern() {
        let w = Wheel::chi(4).unwrap();
        let mut wheel = CamWheel::new(w);
        load(&mut wheel, &CamPattern::from(vec![true; 23]));
        load(&mut wheel, &CamPattern::from(vec![false; 23]));
        assert!((0..23).all(|k| !wheel.cam(k)));
    }

    #[test]
    fn test_head_follows_setting_and_movement() {
        let w = Wheel::chi(0).unwrap();
        let pattern: CamPattern = (0..41).map(|k| k == 5).collect();
        let mut wheel = CamWheel::new(w);
        load(&mut wheel, &pattern);
        assert!(wheel.set_step_count(3));
        assert!(!wheel.head());
        wheel.advance();
        wheel.advance();
        assert_eq!(wheel.head_position(), 5);
        assert!(wheel.head());
        wheel.reset_movement();
        assert_eq!(wheel.head_position(), 3);
        for _ in 0..41 {
            wheel.advance();
        }
        assert_eq!(wheel.head_position(), 3);
    }

    #[test]
    fn test_rejects_long_step_count() {
        let mut wheel = CamWheel::new(Wheel::chi(4).unwrap());
        assert!(wheel.set_step_count(22));
        assert!(!wheel.set_step_count(23));
        assert_eq!(wheel.step_count(), 22);
    }
}
