use base::address::{self, ack, fault, sub};
use base::print::PrintRecord;
use base::wheels::CamPattern;
use base::wire::Command;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::printer;

/// Execute a command which must succeed, returning its value.
fn ok(m: &mut Colossus, address: u8, data: u8) -> u8 {
    let response = m.execute(&Command::new(address, data));
    assert!(!response.error_flag, "unexpected error: {response}");
    response.value
}

/// Execute a command which must fail, returning its error code.
fn err(m: &mut Colossus, command: Command) -> u8 {
    let response = m.execute(&command);
    assert!(response.error_flag, "unexpected success: {response}");
    assert_eq!(response.command, command);
    response.value
}

fn punch(m: &mut Colossus, letters: &[u8]) {
    assert_eq!(ok(m, address::TAPE_WRITE_RESET, 0), ack::TAPE_WRITE_RESET);
    if let Some((first, rest)) = letters.split_first() {
        assert_eq!(ok(m, address::TAPE_PUNCH, *first), ack::TAPE_PUNCH);
        for &z in rest {
            let response = m.execute(&Command::bare(z));
            assert_eq!(response, Response::ok(Command::bare(z), ack::TAPE_PUNCH));
        }
    }
    assert_eq!(ok(m, address::TAPE_PUNCH, 0x3f), ack::TAPE_PUNCH);
}

fn random_letters(seed: u64, n: usize, limit: u16) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| rng.random_range(0..limit) as u8)
        .collect()
}

fn load_wheel(m: &mut Colossus, wheel: usize, pattern: &CamPattern) {
    for chunk in pattern.load_octets() {
        assert_eq!(
            ok(m, address::cam_wheel_pattern(wheel), chunk),
            ack::WHEEL_LOAD
        );
    }
}

/// Snoop `target` at `n` successive sprockets, starting from a
/// movement reset.
fn snoop_run(m: &mut Colossus, target: u8, n: usize) -> Vec<u8> {
    assert_eq!(ok(m, address::MOVEMENT, 0), ack::MOVEMENT_RESET);
    (0..n)
        .map(|_| {
            let value = ok(m, address::SNOOP, target);
            assert_eq!(ok(m, address::MOVEMENT, 1), ack::MOVEMENT_MOVE);
            value
        })
        .collect()
}

fn read_counters(m: &mut Colossus) -> [u16; N_COUNTERS] {
    std::array::from_fn(|i| {
        let lsb = ok(m, address::COUNTERS, i as u8);
        let msb = ok(m, address::COUNTERS, sub::COUNTER_MSB + i as u8);
        u16::from_le_bytes([lsb, msb])
    })
}

fn printer_contents(m: &mut Colossus) -> Vec<u8> {
    let lsb = ok(m, address::PRINTER_READ, sub::PRINTER_LENGTH_LSB);
    let msb = ok(m, address::PRINTER_READ, sub::PRINTER_LENGTH_MSB);
    let len = usize::from(u16::from_le_bytes([lsb, msb]));
    assert_eq!(
        ok(m, address::PRINTER_READ, sub::PRINTER_REWIND),
        ack::PRINTER_REWIND
    );
    (0..len)
        .map(|_| ok(m, address::PRINTER_READ, sub::PRINTER_READ_NEXT))
        .collect()
}

#[test]
fn test_unknown_addresses() {
    let mut m = Colossus::new();
    for a in [0u8, 1, 9, 30, 79, 122, 129, 140, 145, 194, 223] {
        assert_eq!(
            err(&mut m, Command::new(a, 0)),
            fault::UNKNOWN_BODY_ADDRESS,
            "address {a}"
        );
    }
    for a in [237u8, 238, 239, 245, 255] {
        assert_eq!(
            err(&mut m, Command::new(a, 0)),
            fault::UNKNOWN_HEAD_ADDRESS,
            "address {a}"
        );
    }
}

#[test]
fn test_data_only_needs_latched_address() {
    let mut m = Colossus::new();
    assert_eq!(err(&mut m, Command::bare(0x21)), fault::NO_LATCHED_ADDRESS);
    // Once latched, a bare byte goes to the same register.
    assert_eq!(ok(&mut m, address::NIBBLE_ADDER, 0x12), 3);
    assert_eq!(m.execute(&Command::bare(0x34)).value, 7);
}

#[test]
fn test_bad_data() {
    let mut m = Colossus::new();
    for (a, d) in [
        (address::MOVEMENT, 2),
        (address::TAPE_CLEAR, 1),
        (address::SNOOP, 6),
        (address::WORKER_DISPATCH, 4),
        (address::COUNTERS, 5),
        (address::Q_SELECTOR_CONFIG, 0x40),
        (address::cam_wheel_control(4), 23),
        (address::cam_wheel_control(0), 0x42),
        (address::step_count_config(0), 0x10),
        (address::STEP_COUNT_VECTOR, 12),
        (address::HEAD_SCHEDULER, 2),
        (address::TAIL_SCHEDULER, 2),
        (address::PRINTER_READ, sub::PRINTER_READ_NEXT),
    ] {
        assert_eq!(
            err(&mut m, Command::new(a, d)),
            fault::BAD_DATA,
            "address {a} data {d:#x}"
        );
    }
}

#[test]
fn test_nibble_adder() {
    let mut m = Colossus::new();
    for n0 in 0..16u8 {
        for n1 in 0..16u8 {
            assert_eq!(
                ok(&mut m, address::NIBBLE_ADDER, (n1 << 4) | n0),
                (n0 + n1) % 16
            );
        }
    }
}

#[test]
fn test_clear_tape() {
    let mut m = Colossus::new();
    punch(&mut m, &[1, 2, 3]);
    assert_eq!(ok(&mut m, address::TAPE_CLEAR, 0), ack::TAPE_CLEAR);
    assert_eq!(ok(&mut m, address::TAPE_READ, 0), ack::TAPE_REWIND);
    for _ in 0..320 {
        assert_eq!(ok(&mut m, address::TAPE_READ, 1), 0xa5);
    }
}

#[test]
fn test_tape_round_trip_and_snoop_z() {
    let mut m = Colossus::new();
    let zs = random_letters(42, 320, 256);
    punch(&mut m, &zs);
    assert_eq!(ok(&mut m, address::TAPE_READ, 0), ack::TAPE_REWIND);
    let read_back: Vec<u8> = (0..zs.len())
        .map(|_| ok(&mut m, address::TAPE_READ, 1))
        .collect();
    assert_eq!(read_back, zs);

    let expected: Vec<u8> = zs
        .iter()
        .map(|z| (z & 0x1f) | if z & 0x20 != 0 { 0x80 } else { 0 })
        .collect();
    assert_eq!(snoop_run(&mut m, sub::SNOOP_Z, zs.len()), expected);
}

#[test]
fn test_q_shows_z() {
    let mut m = Colossus::new();
    let zs = random_letters(1, 320, 32);
    punch(&mut m, &zs);
    assert_eq!(ok(&mut m, address::Q_SELECTOR_CONFIG, 0b100000), ack::CONFIG);
    assert_eq!(snoop_run(&mut m, sub::SNOOP_Q, zs.len()), zs);
}

#[test]
fn test_q_delta_z() {
    let mut m = Colossus::new();
    let zs = random_letters(2, 320, 32);
    punch(&mut m, &zs);
    ok(&mut m, address::Q_SELECTOR_CONFIG, 0b110000);
    // Leave junk in the previous-letter registers.
    snoop_run(&mut m, sub::SNOOP_Q, 5);
    let qs = snoop_run(&mut m, sub::SNOOP_Q, zs.len());
    assert_eq!(qs[0], zs[0]);
    for i in 1..zs.len() {
        assert_eq!(qs[i], zs[i] ^ zs[i - 1], "sprocket {i}");
    }
}

#[test]
fn test_q_is_a_register() {
    let mut m = Colossus::new();
    ok(&mut m, address::Q_SELECTOR_CONFIG, 0b100000);
    ok(&mut m, address::MOVEMENT, 0);
    assert_eq!(
        ok(&mut m, address::Q_SELECTOR_CONTROL, 0),
        ack::Q_SELECTOR_RESET
    );
    assert_eq!(ok(&mut m, address::SNOOP, sub::SNOOP_Q), 0);
    punch(&mut m, &[31]);
    ok(&mut m, address::Q_SELECTOR_CONTROL, 1);
    for z in 0..32u8 {
        punch(&mut m, &[z]);
        assert_eq!(ok(&mut m, address::SNOOP, sub::SNOOP_Q), z.wrapping_sub(1) % 32);
        assert_eq!(
            ok(&mut m, address::Q_SELECTOR_CONTROL, 1),
            ack::Q_SELECTOR_ONE_SHOT
        );
        assert_eq!(ok(&mut m, address::SNOOP, sub::SNOOP_Q), z);
    }
}

#[test]
fn test_wheel_pattern_at_every_offset() {
    let mut m = Colossus::new();
    let mut rng = StdRng::seed_from_u64(5);
    let pattern: CamPattern = (0..43).map(|_| rng.random::<bool>()).collect();
    let control = address::cam_wheel_control(5);
    load_wheel(&mut m, 5, &pattern);
    for offset in 0..43u8 {
        assert_eq!(ok(&mut m, control, offset), ack::WHEEL_SET_STEP_COUNT);
        assert_eq!(ok(&mut m, control, 0x40), ack::WHEEL_RESET_MOVEMENT);
        let seen: Vec<bool> = (0..43)
            .map(|_| {
                let cam = ok(&mut m, control, 0xc0) != 0;
                assert_eq!(ok(&mut m, control, 0x41), ack::WHEEL_MOVE_ONE_SHOT);
                cam
            })
            .collect();
        assert_eq!(seen, pattern.rotated_left(offset.into()).bits());
        assert_eq!(ok(&mut m, control, 0x80), offset);
    }
}

#[test]
fn test_step_count_vector_over_bus() {
    let mut m = Colossus::new();
    assert_eq!(
        ok(&mut m, address::step_count_config(4), 0b1010),
        ack::CONFIG
    );
    ok(&mut m, address::step_count_config(3), 0b0100);
    assert_eq!(
        ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_RESET),
        ack::VECTOR_RESET
    );
    for n in 0..100usize {
        assert_eq!(usize::from(ok(&mut m, address::STEP_COUNT_VECTOR, 4)), n % 23);
        assert_eq!(usize::from(ok(&mut m, address::STEP_COUNT_VECTOR, 3)), n / 23);
        assert_eq!(
            ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_NEXT),
            ack::VECTOR_NEXT
        );
    }
    assert_eq!(ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_ENDED), 0);
    let frame: Vec<u8> = (0..16)
        .map(|i| ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_FRAME + i))
        .collect();
    let mut expected = vec![0u8; 16];
    expected[1] = 0x2d;
    expected[2] = 0x3f;
    expected[3 + 3] = 4;
    expected[3 + 4] = 100 % 23;
    assert_eq!(frame, expected);
}

#[test]
fn test_transfer_to_wheels() {
    let mut m = Colossus::new();
    ok(&mut m, address::step_count_config(0), 0b1000);
    ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_RESET);
    for _ in 0..7 {
        ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_NEXT);
    }
    assert_eq!(ok(&mut m, address::HEAD_SCHEDULER, sub::BROADCAST_BODY), ack::CONFIG);
    assert_eq!(
        ok(&mut m, address::cam_wheel_control(0), sub::WHEEL_READ_STEP_COUNT),
        7
    );
    assert_eq!(
        ok(&mut m, address::cam_wheel_control(1), sub::WHEEL_READ_STEP_COUNT),
        0
    );
}

fn establish_sample_counts(m: &mut Colossus, zs: &[u8]) -> [u16; N_COUNTERS] {
    punch(m, zs);
    // Counters 2 and 4 need impulse 5; counters 3 and 4 need impulse 4.
    for (a, d) in [
        (address::q_panel_top_unit(0, 0), 0x01),
        (address::q_panel_top_unit(0, 1), 0x01),
        (address::q_panel_top_unit(0, 2), 0x05),
        (address::q_panel_top_unit(1, 0), 0x02),
        (address::q_panel_top_unit(1, 1), 0x02),
        (address::q_panel_top_unit(1, 2), 0x03),
    ] {
        assert_eq!(ok(m, a, d), ack::CONFIG);
    }
    ok(m, address::Q_SELECTOR_CONFIG, 0x20);
    let count = |mask: u8| zs.iter().filter(|&&z| z & mask == mask).count() as u16;
    let n = zs.len() as u16;
    [n, n, count(0x01), count(0x02), count(0x03)]
}

#[test]
fn test_tape_pass_counts() {
    let mut m = Colossus::new();
    let zs = random_letters(42, 60, 32);
    let expected = establish_sample_counts(&mut m, &zs);
    assert_eq!(ok(&mut m, address::WORKER_DISPATCH, 2), ack::CONFIG);
    assert_eq!(read_counters(&mut m), expected);
}

#[test]
fn test_one_shot_counts() {
    let mut m = Colossus::new();
    let zs = random_letters(43, 60, 32);
    let expected = establish_sample_counts(&mut m, &zs);
    ok(&mut m, address::MOVEMENT, 0);
    assert_eq!(ok(&mut m, address::COUNTERS, 0x80), ack::COUNTERS_RESET);
    for _ in 0..zs.len() {
        assert_eq!(
            ok(&mut m, address::COUNTERS, 0x81),
            ack::COUNTERS_COUNT_ONE_SHOT
        );
        ok(&mut m, address::MOVEMENT, 1);
    }
    // Nothing is visible until the counters are latched.
    assert_eq!(read_counters(&mut m), [0; N_COUNTERS]);
    assert_eq!(ok(&mut m, address::COUNTERS, 0x82), ack::COUNTERS_LATCH);
    assert_eq!(read_counters(&mut m), expected);
}

#[test]
fn test_counting_with_delta() {
    for (config, expected) in [
        (0x20, 40),
        (0x30, 39),
        (0x28, 40),
        (0x2c, 39),
        (0x22, 40),
        (0x23, 39),
    ] {
        let mut m = Colossus::new();
        punch(&mut m, &[0; 40]);
        ok(&mut m, address::Q_SELECTOR_CONFIG, config);
        ok(&mut m, address::WORKER_DISPATCH, 2);
        assert_eq!(
            read_counters(&mut m),
            [expected; N_COUNTERS],
            "config {config:#x}"
        );
    }
}

#[test]
fn test_counting_negated_top_unit() {
    let mut zs = [0u8; 40];
    zs[..20].fill(31);
    for negate in [false, true] {
        let mut m = Colossus::new();
        punch(&mut m, &zs);
        ok(&mut m, address::Q_SELECTOR_CONFIG, 0x20);
        ok(&mut m, address::q_panel_top_unit(0, 0), 0x01);
        ok(&mut m, address::q_panel_top_unit(0, 1), 0x01);
        ok(
            &mut m,
            address::q_panel_top_unit(0, 2),
            0x01 | if negate { 0x80 } else { 0 },
        );
        ok(&mut m, address::WORKER_DISPATCH, 2);
        assert_eq!(read_counters(&mut m), [40, 40, 40, 40, 20]);
    }
}

#[test]
fn test_latch_worker_clears_live_counters() {
    let mut m = Colossus::new();
    ok(&mut m, address::COUNTERS, 0x80);
    ok(&mut m, address::COUNTERS, 0x81);
    ok(&mut m, address::COUNTERS, 0x81);
    ok(&mut m, address::WORKER_DISPATCH, 3);
    assert_eq!(read_counters(&mut m), [2; N_COUNTERS]);
    ok(&mut m, address::WORKER_DISPATCH, 3);
    assert_eq!(read_counters(&mut m), [0; N_COUNTERS]);
}

#[test]
fn test_maybe_print() {
    let settings: [u8; N_WHEELS] = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8];
    for always in [false, true] {
        let mut m = Colossus::new();
        for (wheel, &s) in settings.iter().enumerate() {
            ok(&mut m, address::cam_wheel_control(wheel), s);
        }
        let zs = random_letters(42, 60, 32);
        let counts = establish_sample_counts(&mut m, &zs);
        ok(&mut m, address::WORKER_DISPATCH, 2);
        if always {
            ok(&mut m, address::threshold(0, 0), 0);
            ok(&mut m, address::threshold(0, 1), 0x80);
        }
        assert_eq!(ok(&mut m, address::PRINTER_RESET, 0), ack::PRINTER_RESET);
        ok(&mut m, address::WORKER_DISPATCH, 0);
        ok(&mut m, address::WORKER_DISPATCH, 1);
        for (i, &s) in settings.iter().enumerate() {
            assert_eq!(ok(&mut m, address::COMPARATOR, i as u8), s);
        }
        assert_eq!(ok(&mut m, address::COMPARATOR, 0x43), u8::from(always));
        assert_eq!(ok(&mut m, address::TAIL_SCHEDULER, 0), ack::MAYBE_PRINT);
        let octets = printer_contents(&mut m);
        if always {
            let records = PrintRecord::all_from_octets(&octets).unwrap();
            assert_eq!(
                records,
                vec![PrintRecord {
                    body_id: 0,
                    stepping_settings: settings,
                    counters: counts,
                }]
            );
        } else {
            assert!(octets.is_empty());
        }
    }
}

#[test]
fn test_printer_write() {
    let mut m = Colossus::new();
    ok(&mut m, address::PRINTER_RESET, 0);
    for &ch in b"HELLO" {
        assert_eq!(ok(&mut m, address::PRINTER_WRITE, ch), ack::CONFIG);
    }
    assert_eq!(printer_contents(&mut m), b"HELLO".to_vec());
}

/// Fill the printer until only `room` octets remain.
fn fill_printer(m: &mut Colossus, room: usize) {
    ok(m, address::PRINTER_RESET, 0);
    assert!(m.printer.write(&vec![b'.'; printer::CAPACITY - room]));
}

fn always_print(m: &mut Colossus) {
    ok(m, address::threshold(0, 0), 0);
    ok(m, address::threshold(0, 1), 0x80);
}

#[test]
fn test_printer_write_when_full() {
    let mut m = Colossus::new();
    fill_printer(&mut m, 1);
    assert_eq!(ok(&mut m, address::PRINTER_WRITE, b'A'), ack::CONFIG);
    assert_eq!(
        err(&mut m, Command::new(address::PRINTER_WRITE, b'B')),
        fault::BAD_DATA
    );
    assert_eq!(m.printer.len(), printer::CAPACITY);
}

#[test]
fn test_maybe_print_when_printer_full() {
    let mut m = Colossus::new();
    fill_printer(&mut m, 10);
    always_print(&mut m);
    ok(&mut m, address::WORKER_DISPATCH, 0);
    ok(&mut m, address::WORKER_DISPATCH, 1);
    assert_eq!(
        err(&mut m, Command::new(address::TAIL_SCHEDULER, 0)),
        fault::BAD_DATA
    );
    assert_eq!(m.printer.len(), printer::CAPACITY - 10);

    // With room for the record, the same command succeeds.
    ok(&mut m, address::PRINTER_RESET, 0);
    assert_eq!(ok(&mut m, address::TAIL_SCHEDULER, 0), ack::MAYBE_PRINT);
    assert_eq!(m.printer.len(), PrintRecord::ENCODED_LEN);
}

#[test]
fn test_run_stops_when_printer_overflows() {
    let mut m = Colossus::new();
    punch(&mut m, &random_letters(7, 30, 32));
    ok(&mut m, address::step_count_config(0), 0b1000);
    always_print(&mut m);
    fill_printer(&mut m, 3 * PrintRecord::ENCODED_LEN + 1);
    assert_eq!(
        err(&mut m, Command::new(address::HEAD_SCHEDULER, sub::INITIATE_RUN)),
        fault::BAD_DATA
    );
    // Three settings were printed; the fourth did not fit, and the
    // vector was left at that setting.
    assert_eq!(m.printer.len(), printer::CAPACITY - 1);
    assert_eq!(ok(&mut m, address::STEP_COUNT_VECTOR, 0), 3);
    assert_eq!(ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_ENDED), 0);
    assert_eq!(
        ok(&mut m, address::cam_wheel_control(0), sub::WHEEL_READ_STEP_COUNT),
        3
    );
}

#[test]
fn test_run_gives_up_at_limit() {
    let mut m = Colossus::with_run_limit(100);
    punch(&mut m, &random_letters(9, 20, 32));
    // chi-1 drives chi-2, so the vector only comes back round after
    // 41 * 31 settings.
    ok(&mut m, address::step_count_config(0), 0b1010);
    ok(&mut m, address::step_count_config(1), 0b0100);
    always_print(&mut m);
    ok(&mut m, address::PRINTER_RESET, 0);
    assert_eq!(
        ok(&mut m, address::HEAD_SCHEDULER, sub::INITIATE_RUN),
        ack::RUN_INITIATED
    );
    let records = PrintRecord::all_from_octets(&printer_contents(&mut m)).unwrap();
    assert_eq!(records.len(), 100);
    let last = &records[99];
    assert_eq!(last.stepping_settings[0], 99 % 41);
    assert_eq!(last.stepping_settings[1], 99 / 41);
    assert_eq!(last.body_id, 0);
    // The vector has moved on to the next setting, which was never
    // tried, and the wheels still hold the last one.
    assert_eq!(usize::from(ok(&mut m, address::STEP_COUNT_VECTOR, 0)), 100 % 41);
    assert_eq!(usize::from(ok(&mut m, address::STEP_COUNT_VECTOR, 1)), 100 / 41);
    assert_eq!(ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_ENDED), 0);
    assert_eq!(
        ok(&mut m, address::cam_wheel_control(0), sub::WHEEL_READ_STEP_COUNT),
        99 % 41
    );
    assert_eq!(
        ok(&mut m, address::cam_wheel_control(1), sub::WHEEL_READ_STEP_COUNT),
        99 / 41
    );
}

#[test]
fn test_default_run_limit() {
    assert_eq!(Colossus::new().run_limit, MAX_RUN_SETTINGS);
}

#[test]
fn test_chi1_short_run() {
    let mut m = Colossus::new();
    punch(&mut m, &random_letters(7, 30, 32));
    ok(&mut m, address::step_count_config(0), 0b1000);
    ok(&mut m, address::threshold(0, 0), 0);
    ok(&mut m, address::threshold(0, 1), 0x80);
    ok(&mut m, address::PRINTER_RESET, 0);
    assert_eq!(
        ok(&mut m, address::HEAD_SCHEDULER, sub::INITIATE_RUN),
        ack::RUN_INITIATED
    );
    let records = PrintRecord::all_from_octets(&printer_contents(&mut m)).unwrap();
    assert_eq!(records.len(), 41);
    let chi1: Vec<u8> = records.iter().map(|r| r.stepping_settings[0]).collect();
    assert_eq!(chi1, (0..41).collect::<Vec<u8>>());
    assert_eq!(records.iter().filter(|r| r.body_id == 0).count(), 20);
    assert_eq!(records.iter().filter(|r| r.body_id == 1).count(), 21);
    assert!(records.iter().all(|r| r.counters[0] == 30));
    assert_eq!(ok(&mut m, address::STEP_COUNT_VECTOR, sub::VECTOR_ENDED), 1);
}

#[test]
fn test_motor_snoop() {
    let mut m = Colossus::new();
    let mu61: CamPattern = (0..61).map(|k| k % 2 == 0).collect();
    let mu37: CamPattern = (0..37).map(|k| k == 0).collect();
    load_wheel(&mut m, 10, &mu61);
    load_wheel(&mut m, 11, &mu37);
    let motors = snoop_run(&mut m, sub::SNOOP_MOTOR, 4);
    // mu-37 moves off its only raised cam after the first sprocket.
    assert_eq!(motors, vec![0b11, 0b00, 0b10, 0b00]);
}
