//! The five set-total counters.
//!
//! Counting happens in the live registers.  Reads over the bus see
//! only the latched copy, which is updated by an explicit latch.
use tracing::{Level, event};

use base::wheels::N_COUNTERS;

#[derive(Debug, Clone, Default)]
pub struct Counters {
    live: [u16; N_COUNTERS],
    latched: [u16; N_COUNTERS],
}

impl Counters {
    pub fn reset_live(&mut self) {
        self.live = [0; N_COUNTERS];
    }

    /// Count one sprocket.  Counter `i` is incremented when bit
    /// `4 - i` of `mask` is set.
    pub fn count(&mut self, mask: u8) {
        for (i, counter) in self.live.iter_mut().enumerate() {
            if mask & (0x10 >> i) != 0 {
                *counter = counter.wrapping_add(1);
            }
        }
    }

    pub fn latch(&mut self) {
        self.latched = self.live;
        event!(Level::DEBUG, "latched counters {:?}", self.latched);
    }

    /// Latch, then start counting again from zero.
    pub fn latch_and_clear(&mut self) {
        self.latch();
        self.reset_live();
    }

    pub fn latched(&self) -> &[u16; N_COUNTERS] {
        &self.latched
    }
}

#[test]
fn test_count_and_latch() {
    let mut c = Counters::default();
    c.count(0x10);
    c.count(0x11);
    c.count(0x01);
    assert_eq!(c.latched(), &[0; N_COUNTERS]);
    c.latch();
    assert_eq!(c.latched(), &[2, 0, 0, 0, 2]);
    c.count(0x1f);
    assert_eq!(c.latched(), &[2, 0, 0, 0, 2]);
    c.latch_and_clear();
    assert_eq!(c.latched(), &[3, 1, 1, 1, 3]);
    c.latch();
    assert_eq!(c.latched(), &[0; N_COUNTERS]);
}
