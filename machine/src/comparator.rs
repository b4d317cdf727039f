//! The comparator holds a snapshot of the wheel settings and counter
//! values, compares the counters against their thresholds, and
//! produces print records.
use tracing::{Level, event};

use base::print::PrintRecord;
use base::threshold::{self, ThresholdConfig};
use base::wheels::{N_COUNTERS, N_WHEELS};

#[derive(Debug, Clone, Default)]
pub struct Comparator {
    settings: [u8; N_WHEELS],
    counters: [u16; N_COUNTERS],
    thresholds: [ThresholdConfig; N_COUNTERS],
}

impl Comparator {
    pub fn set_settings(&mut self, settings: [u8; N_WHEELS]) {
        self.settings = settings;
    }

    pub fn set_counters(&mut self, counters: [u16; N_COUNTERS]) {
        self.counters = counters;
    }

    pub fn settings(&self) -> &[u8; N_WHEELS] {
        &self.settings
    }

    pub fn counters(&self) -> &[u16; N_COUNTERS] {
        &self.counters
    }

    /// Write register `offset` (0 or 1) of the threshold for
    /// `counter`.
    pub fn write_threshold(&mut self, counter: usize, offset: usize, value: u8) -> bool {
        let mut regs = self.thresholds[counter].encode();
        regs[offset] = value;
        match ThresholdConfig::decode(regs) {
            Ok(cfg) => {
                event!(
                    Level::DEBUG,
                    "counter {counter} threshold: {} {}",
                    cfg.operation(),
                    cfg.threshold()
                );
                self.thresholds[counter] = cfg;
                true
            }
            Err(e) => {
                event!(Level::WARN, "counter {counter} threshold: {e}");
                false
            }
        }
    }

    pub fn gt_vector(&self) -> u8 {
        threshold::gt_vector(&self.counters, &self.thresholds)
    }

    pub fn lt_vector(&self) -> u8 {
        threshold::lt_vector(&self.counters, &self.thresholds)
    }

    pub fn print_required_vector(&self) -> u8 {
        threshold::print_required_vector(&self.counters, &self.thresholds)
    }

    pub fn print_required(&self) -> bool {
        threshold::print_required(&self.counters, &self.thresholds)
    }

    /// The record to print for `body_id`, if the snapshot passes the
    /// thresholds.
    pub fn maybe_record(&self, body_id: u8) -> Option<PrintRecord> {
        self.print_required().then(|| PrintRecord {
            body_id,
            stepping_settings: self.settings,
            counters: self.counters,
        })
    }
}
