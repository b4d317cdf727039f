use std::fs;
use std::io;

use base::address::fault;
use base::prelude::*;
use host::{Channel, DeviceFault, Fault, StreamTransport};

mod common;
use common::session;

#[test]
fn test_session_start_resets_configuration() {
    let mut s = session();
    // Step counts, stepping modes and thresholds.
    assert_eq!(s.channel().commands_sent(), 12 + 12 + 2 * 5);
    assert_eq!(s.read_step_count_vector().unwrap(), [0; N_WHEELS]);
    assert!(!s.print_required().unwrap());
}

#[test]
fn test_nibble_adder() {
    let mut s = session();
    for (n0, n1) in [(3, 7), (7, 3), (9, 12), (1, 1), (0, 4), (4, 9), (15, 15)] {
        assert_eq!(s.add_nibbles(n0, n1).unwrap(), (n0 + n1) % 16);
    }
    assert!(matches!(s.add_nibbles(16, 0), Err(Fault::Range(_))));
}

#[test]
fn test_unknown_target_address() {
    let mut s = session();
    for (address, code) in [
        (0xfe, fault::UNKNOWN_HEAD_ADDRESS),
        (0x01, fault::UNKNOWN_BODY_ADDRESS),
    ] {
        let command = Command::new(address, 1);
        let response = s.channel().execute(command).unwrap();
        assert!(response.error_flag);
        assert_eq!(response.value, code);
        assert!(matches!(
            s.channel().execute_value(command),
            Err(Fault::Device(DeviceFault::ErrorFlag { code: c, .. })) if c == code
        ));
    }
}

#[test]
fn test_bad_data_is_a_device_fault() {
    let mut s = session();
    let command = Command::new(base::address::WORKER_DISPATCH, 9);
    match s.channel().execute_checked(command, 0x12) {
        Err(Fault::Device(e)) => {
            assert_eq!(e.command(), command);
            assert_eq!(
                e,
                DeviceFault::ErrorFlag {
                    command,
                    code: fault::BAD_DATA
                }
            );
        }
        other => panic!("expected a device fault, got {other:?}"),
    }
}

#[test]
fn test_spooled_transcript() {
    let frames = "0821\n1c00\n1d07\n09\n";
    // The device's answers do not depend on timing, so a transcript
    // can be prepared in advance.
    let mut replies: Vec<u8> = Vec::new();
    machine::serve(&mut machine::Colossus::new(), frames.as_bytes(), &mut replies).unwrap();

    let sent = tempfile::NamedTempFile::new().expect("should be able to create a temporary file");
    let received =
        tempfile::NamedTempFile::new().expect("should be able to create a temporary file");
    let transport = StreamTransport::new(replies.as_slice(), io::sink()).with_spool(
        Box::new(sent.reopen().unwrap()),
        Box::new(received.reopen().unwrap()),
    );
    let mut channel = Channel::new(transport);
    channel.wait_until_ready().unwrap();
    assert_eq!(channel.execute_value(Command::new(8, 0x21)).unwrap(), 3);
    channel.execute_checked(Command::new(28, 0), 0x44).unwrap();
    channel.execute_checked(Command::new(29, 7), 0x55).unwrap();
    channel.execute_checked(Command::bare(9), 0x55).unwrap();
    drop(channel);

    assert_eq!(fs::read_to_string(sent.path()).unwrap(), frames);
    assert_eq!(
        fs::read_to_string(received.path()).unwrap(),
        String::from_utf8(replies).unwrap()
    );
}
