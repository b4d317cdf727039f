//! The command channel: one request, one response, strictly in turn.
use std::fmt::{self, Debug, Formatter};
use std::io::{self, BufRead, Write};

use tracing::{Level, event};

use base::prelude::*;
use base::wire::READY_MARKER;

use crate::error::{DeviceFault, Fault, ProtocolFault};

/// Sends commands over a [`Transport`] and checks the echoed
/// responses.
#[derive(Debug)]
pub struct Channel<T: Transport> {
    transport: T,
    commands_sent: usize,
}

impl<T: Transport> Channel<T> {
    pub fn new(transport: T) -> Channel<T> {
        Channel {
            transport,
            commands_sent: 0,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn commands_sent(&self) -> usize {
        self.commands_sent
    }

    /// Discard lines until the device announces that it is ready.
    pub fn wait_until_ready(&mut self) -> Result<(), ProtocolFault> {
        loop {
            match self.transport.read_line()? {
                Some(line) if line.starts_with(READY_MARKER) => {
                    event!(Level::DEBUG, "device is ready");
                    return Ok(());
                }
                Some(line) => {
                    event!(Level::TRACE, "skipping '{line}' while waiting for device");
                }
                None => {
                    return Err(ProtocolFault::EndOfStream {
                        awaiting: "the ready banner".to_string(),
                    });
                }
            }
        }
    }

    /// Send `command` and wait for its response.  Lines which are not
    /// responses are skipped.
    pub fn execute(&mut self, command: Command) -> Result<Response, ProtocolFault> {
        self.transport.write_frame(&command.frame())?;
        self.commands_sent += 1;
        loop {
            let Some(line) = self.transport.read_line()? else {
                return Err(ProtocolFault::EndOfStream {
                    awaiting: format!("the response to {command}"),
                });
            };
            match Response::parse_line(&line)? {
                None => {
                    event!(Level::TRACE, "skipping non-response line '{line}'");
                }
                Some(response) if response.command != command => {
                    return Err(ProtocolFault::EchoMismatch {
                        sent: command,
                        echoed: response.command,
                    });
                }
                Some(response) => {
                    event!(Level::TRACE, "{command} -> {response}");
                    return Ok(response);
                }
            }
        }
    }

    /// Send `command`, failing unless the device answers with the
    /// acknowledgement `expected`.
    pub fn execute_checked(&mut self, command: Command, expected: u8) -> Result<(), Fault> {
        let got = self.execute_value(command)?;
        if got == expected {
            Ok(())
        } else {
            Err(DeviceFault::UnexpectedAck {
                command,
                expected,
                got,
            }
            .into())
        }
    }

    /// Send `command`, failing if the device raises its error flag,
    /// and return the value.
    pub fn execute_value(&mut self, command: Command) -> Result<u8, Fault> {
        let response = self.execute(command)?;
        if response.error_flag {
            Err(DeviceFault::ErrorFlag {
                command,
                code: response.value,
            }
            .into())
        } else {
            Ok(response.value)
        }
    }
}

/// A transport over a pair of byte streams, such as the standard
/// input and output of a device process.
///
/// Optionally every frame sent and every line received is copied to a
/// spool.
pub struct StreamTransport<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    sent_spool: Option<Box<dyn Write>>,
    received_spool: Option<Box<dyn Write>>,
}

impl<R: BufRead, W: Write> Debug for StreamTransport<R, W> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("StreamTransport")
            .field("spooling", &self.sent_spool.is_some())
            .finish_non_exhaustive()
    }
}

impl<R: BufRead, W: Write> StreamTransport<R, W> {
    pub fn new(reader: R, writer: W) -> StreamTransport<R, W> {
        StreamTransport {
            reader,
            writer,
            sent_spool: None,
            received_spool: None,
        }
    }

    /// Copy frames we send to `sent` and lines we receive to
    /// `received`.
    pub fn with_spool(mut self, sent: Box<dyn Write>, received: Box<dyn Write>) -> Self {
        self.sent_spool = Some(sent);
        self.received_spool = Some(received);
        self
    }
}

fn spool(target: &mut Option<Box<dyn Write>>, text: &str) -> io::Result<()> {
    match target {
        Some(w) => {
            w.write_all(text.as_bytes())?;
            w.flush()
        }
        None => Ok(()),
    }
}

impl<R: BufRead, W: Write> Transport for StreamTransport<R, W> {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        self.writer.write_all(frame.as_bytes())?;
        self.writer.flush()?;
        spool(&mut self.sent_spool, frame)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        spool(&mut self.received_spool, &line)?;
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned device output and records what was sent.
    struct Scripted {
        replies: VecDeque<&'static str>,
        sent: Vec<String>,
    }

    impl Scripted {
        fn new(replies: &[&'static str]) -> Scripted {
            Scripted {
                replies: replies.iter().copied().collect(),
                sent: Vec::new(),
            }
        }
    }

    impl Transport for Scripted {
        fn write_frame(&mut self, frame: &str) -> io::Result<()> {
            self.sent.push(frame.to_string());
            Ok(())
        }

        fn read_line(&mut self) -> io::Result<Option<String>> {
            Ok(self.replies.pop_front().map(str::to_string))
        }
    }

    #[test]
    fn test_skips_noise() {
        let mut ch = Channel::new(Scripted::new(&[
            "booting",
            "READY-FOR-INPUT",
            "debug: something",
            "COLOSSUS-RESPONSE: 0821 '0' 3",
        ]));
        ch.wait_until_ready().unwrap();
        assert_eq!(ch.execute_value(Command::new(8, 0x21)).unwrap(), 3);
        assert_eq!(ch.transport().sent, vec!["0821\n".to_string()]);
        assert_eq!(ch.commands_sent(), 1);
    }

    #[test]
    fn test_echo_mismatch() {
        let mut ch = Channel::new(Scripted::new(&["COLOSSUS-RESPONSE: 0822 '0' 4"]));
        assert!(matches!(
            ch.execute(Command::new(8, 0x21)),
            Err(ProtocolFault::EchoMismatch { sent, echoed })
                if sent == Command::new(8, 0x21) && echoed == Command::new(8, 0x22)
        ));
    }

    #[test]
    fn test_malformed_response() {
        let mut ch = Channel::new(Scripted::new(&["COLOSSUS-RESPONSE: 0821 yes 3"]));
        assert!(matches!(
            ch.execute(Command::new(8, 0x21)),
            Err(ProtocolFault::Malformed(_))
        ));
    }

    #[test]
    fn test_end_of_stream() {
        let mut ch = Channel::new(Scripted::new(&["noise"]));
        assert!(matches!(
            ch.execute(Command::new(8, 0)),
            Err(ProtocolFault::EndOfStream { .. })
        ));
        let mut ch = Channel::new(Scripted::new(&[]));
        assert!(matches!(
            ch.wait_until_ready(),
            Err(ProtocolFault::EndOfStream { .. })
        ));
    }

    #[test]
    fn test_device_faults() {
        let mut ch = Channel::new(Scripted::new(&[
            "COLOSSUS-RESPONSE: fe00 '1' 9",
            "COLOSSUS-RESPONSE: 1a00 '0' 51",
            "COLOSSUS-RESPONSE: 1a00 '0' 50",
        ]));
        assert!(matches!(
            ch.execute_value(Command::new(0xfe, 0)),
            Err(Fault::Device(DeviceFault::ErrorFlag { code: 9, .. }))
        ));
        ch.execute_checked(Command::new(26, 0), 0x33).unwrap();
        assert!(matches!(
            ch.execute_checked(Command::new(26, 0), 0x33),
            Err(Fault::Device(DeviceFault::UnexpectedAck {
                expected: 0x33,
                got: 0x32,
                ..
            }))
        ));
    }

    #[test]
    fn test_stream_transport_trims_line_endings() {
        let input = b"READY-FOR-INPUT\r\nCOLOSSUS-RESPONSE: 08 '1' 5\n".as_slice();
        let mut output: Vec<u8> = Vec::new();
        let mut t = StreamTransport::new(input, &mut output);
        assert_eq!(t.read_line().unwrap().as_deref(), Some("READY-FOR-INPUT"));
        t.write_frame("08\n").unwrap();
        assert_eq!(
            t.read_line().unwrap().as_deref(),
            Some("COLOSSUS-RESPONSE: 08 '1' 5")
        );
        assert_eq!(t.read_line().unwrap(), None);
        drop(t);
        assert_eq!(output, b"08\n");
    }
}
