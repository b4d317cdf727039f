//! The fixed address map of the Colossus register bus, together with
//! the sub-selectors understood at each address and the
//! acknowledgement byte each write produces.
//!
//! ## Address Map
//!
//! | Address  | Unit                                   |
//! | -------- | -------------------------------------- |
//! | 8        | Nibble adder (bus self-test)           |
//! | 16       | Counters                               |
//! | 22-23    | Q selector                             |
//! | 24       | Movement                               |
//! | 25       | Snoop                                  |
//! | 26-29    | Tape                                   |
//! | 80-109   | Q panel top units (3 addresses each)   |
//! | 110-119  | Q panel bottom units (2 addresses each)|
//! | 120-121  | Q panel negation                       |
//! | 128      | Comparator read-back                   |
//! | 130-139  | Set-total thresholds (2 each)          |
//! | 144      | Worker dispatch                        |
//! | 170-193  | Cam wheels (pattern, control) pairs    |
//! | 224-235  | Step-count-vector configuration        |
//! | 236      | Step-count-vector data and control     |
//! | 240      | Head scheduler (transfer, run)         |
//! | 241      | Tail scheduler (maybe-print)           |
//! | 242-244  | Printer                                |
//!
//! Addresses below [`HEAD_SPACE_START`] are served by the bodies;
//! the remainder by the head.

use super::wheels::N_WHEELS;

pub const NIBBLE_ADDER: u8 = 8;
pub const COUNTERS: u8 = 16;
pub const Q_SELECTOR_CONTROL: u8 = 22;
pub const Q_SELECTOR_CONFIG: u8 = 23;
pub const MOVEMENT: u8 = 24;
pub const SNOOP: u8 = 25;
pub const TAPE_CLEAR: u8 = 26;
pub const TAPE_READ: u8 = 27;
pub const TAPE_WRITE_RESET: u8 = 28;
pub const TAPE_PUNCH: u8 = 29;
pub const Q_PANEL_TOP_BASE: u8 = 80;
pub const Q_PANEL_BOTTOM_BASE: u8 = 110;
pub const Q_PANEL_NEGATING_BASE: u8 = 120;
pub const COMPARATOR: u8 = 128;
pub const THRESHOLD_BASE: u8 = 130;
pub const WORKER_DISPATCH: u8 = 144;
pub const CAM_WHEEL_BASE: u8 = 170;
pub const STEP_COUNT_CONFIG_BASE: u8 = 224;
pub const STEP_COUNT_VECTOR: u8 = 236;
pub const HEAD_SCHEDULER: u8 = 240;
pub const TAIL_SCHEDULER: u8 = 241;
pub const PRINTER_READ: u8 = 242;
pub const PRINTER_RESET: u8 = 243;
pub const PRINTER_WRITE: u8 = 244;

/// First address handled by the head rather than by a body.
pub const HEAD_SPACE_START: u8 = 224;

/// Number of lanes (bodies) the head schedules work onto.
pub const N_BODIES: u8 = 2;

/// Length of the command-bus frame emitted by the step-count vector.
pub const STEP_COUNT_FRAME_LEN: usize = 16;

pub const N_Q_PANEL_TOP_UNITS: usize = 10;
pub const N_Q_PANEL_BOTTOM_UNITS: usize = 5;

/// Address of the `offset`-th register of Q panel top unit `unit`.
pub const fn q_panel_top_unit(unit: usize, offset: u8) -> u8 {
    Q_PANEL_TOP_BASE + 3 * (unit as u8) + offset
}

/// Address of the `offset`-th register of Q panel bottom unit `unit`.
pub const fn q_panel_bottom_unit(unit: usize, offset: u8) -> u8 {
    Q_PANEL_BOTTOM_BASE + 2 * (unit as u8) + offset
}

/// Address of the `offset`-th threshold register for `counter`.
pub const fn threshold(counter: usize, offset: u8) -> u8 {
    THRESHOLD_BASE + 2 * (counter as u8) + offset
}

/// Address to which a wheel's pattern chunks are written.
pub const fn cam_wheel_pattern(wheel: usize) -> u8 {
    CAM_WHEEL_BASE + 2 * (wheel as u8)
}

/// Address of a wheel's control register.
pub const fn cam_wheel_control(wheel: usize) -> u8 {
    CAM_WHEEL_BASE + 2 * (wheel as u8) + 1
}

/// Address of a wheel's entry in the step-count-vector configuration.
pub const fn step_count_config(wheel: usize) -> u8 {
    STEP_COUNT_CONFIG_BASE + wheel as u8
}

/// One past the last cam wheel address.
pub const CAM_WHEEL_END: u8 = CAM_WHEEL_BASE + 2 * N_WHEELS as u8;

/// Sub-selectors (data bytes) with special meaning at particular
/// addresses.
pub mod sub {
    pub const COUNTERS_RESET: u8 = 0x80;
    pub const COUNTERS_COUNT_ONE_SHOT: u8 = 0x81;
    pub const COUNTERS_LATCH: u8 = 0x82;
    pub const COUNTER_MSB: u8 = 0x10;

    pub const Q_SELECTOR_RESET: u8 = 0x00;
    pub const Q_SELECTOR_ONE_SHOT: u8 = 0x01;

    pub const MOVEMENT_RESET: u8 = 0x00;
    pub const MOVEMENT_MOVE: u8 = 0x01;

    pub const SNOOP_Z: u8 = 0x00;
    pub const SNOOP_Q: u8 = 0x01;
    pub const SNOOP_CHI: u8 = 0x02;
    pub const SNOOP_PSI: u8 = 0x03;
    pub const SNOOP_MOTOR: u8 = 0x04;
    pub const SNOOP_A: u8 = 0x05;

    pub const TAPE_REWIND: u8 = 0x00;
    pub const TAPE_READ_ADVANCE: u8 = 0x01;

    pub const COMPARATOR_COUNTER_LSB: u8 = 0x20;
    pub const COMPARATOR_COUNTER_MSB: u8 = 0x30;
    pub const COMPARATOR_GT_VECTOR: u8 = 0x40;
    pub const COMPARATOR_LT_VECTOR: u8 = 0x41;
    pub const COMPARATOR_PRINT_VECTOR: u8 = 0x42;
    pub const COMPARATOR_PRINT_REQUIRED: u8 = 0x43;

    /// Data bytes below this value set a wheel's step count.
    pub const WHEEL_STEP_COUNT_LIMIT: u8 = 0x40;
    pub const WHEEL_RESET_MOVEMENT: u8 = 0x40;
    pub const WHEEL_MOVE_ONE_SHOT: u8 = 0x41;
    pub const WHEEL_READ_STEP_COUNT: u8 = 0x80;
    pub const WHEEL_READ_HEAD: u8 = 0xc0;

    pub const VECTOR_ENDED: u8 = 0x10;
    pub const VECTOR_RESET: u8 = 0x20;
    pub const VECTOR_NEXT: u8 = 0x21;
    pub const VECTOR_FRAME: u8 = 0x30;

    /// Body id addressing every body at once.
    pub const BROADCAST_BODY: u8 = 0x3f;
    pub const INITIATE_RUN: u8 = 0xff;

    pub const PRINTER_LENGTH_LSB: u8 = 0x00;
    pub const PRINTER_LENGTH_MSB: u8 = 0x01;
    pub const PRINTER_REWIND: u8 = 0x02;
    pub const PRINTER_READ_NEXT: u8 = 0x03;
}

/// Acknowledgement bytes returned by successful writes.
pub mod ack {
    /// Generic "configuration register written".
    pub const CONFIG: u8 = 0x12;

    pub const COUNTERS_RESET: u8 = 0xa0;
    pub const COUNTERS_COUNT_ONE_SHOT: u8 = 0xa1;
    pub const COUNTERS_LATCH: u8 = 0xa2;
    pub const Q_SELECTOR_RESET: u8 = 0xb4;
    pub const Q_SELECTOR_ONE_SHOT: u8 = 0xb5;
    pub const MOVEMENT_RESET: u8 = 0x61;
    pub const MOVEMENT_MOVE: u8 = 0x63;
    pub const TAPE_CLEAR: u8 = 0x33;
    pub const TAPE_REWIND: u8 = 0x45;
    pub const TAPE_WRITE_RESET: u8 = 0x44;
    pub const TAPE_PUNCH: u8 = 0x55;
    pub const WHEEL_LOAD: u8 = 0x58;
    pub const WHEEL_SET_STEP_COUNT: u8 = 0x30;
    pub const WHEEL_RESET_MOVEMENT: u8 = 0x32;
    pub const WHEEL_MOVE_ONE_SHOT: u8 = 0x33;
    pub const VECTOR_RESET: u8 = 0x18;
    pub const VECTOR_NEXT: u8 = 0x19;
    pub const RUN_INITIATED: u8 = 0x15;
    pub const MAYBE_PRINT: u8 = 0x19;
    pub const PRINTER_RESET: u8 = 0x11;
    pub const PRINTER_REWIND: u8 = 0x32;
}

/// Error codes accompanying a raised error flag.
pub mod fault {
    /// A data-only command arrived before any address was latched.
    pub const NO_LATCHED_ADDRESS: u8 = 0x05;
    /// Neither this body nor the next one claimed the address.
    pub const UNKNOWN_BODY_ADDRESS: u8 = 0x06;
    /// The address was claimed but the data byte is not meaningful.
    pub const BAD_DATA: u8 = 0x07;
    /// The head does not recognise the address.
    pub const UNKNOWN_HEAD_ADDRESS: u8 = 0x09;
}

#[test]
fn test_unit_addresses() {
    assert_eq!(q_panel_top_unit(9, 2), 109);
    assert_eq!(q_panel_bottom_unit(4, 1), 119);
    assert_eq!(threshold(4, 1), 139);
    assert_eq!(cam_wheel_pattern(0), 170);
    assert_eq!(cam_wheel_control(11), 193);
    assert_eq!(CAM_WHEEL_END, 194);
    assert_eq!(step_count_config(11), 235);
}
