//! Text framing of the command bus.
//!
//! The host writes one command per line: two lowercase hex digits of
//! address, optionally followed by two more of data.  The device
//! answers each command with a line of the form
//!
//! ```text
//! COLOSSUS-RESPONSE: <echo> '<0|1>' <decimal value>
//! ```
//!
//! where `<echo>` is the command exactly as received and the quoted
//! digit is the error flag.  Other lines (diagnostics, the ready
//! banner) may appear in the response stream and are skipped by the
//! host.
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::sync::OnceLock;

use regex::Regex;

/// Every response line starts with this.
pub const RESPONSE_MARKER: &str = "COLOSSUS-RESPONSE: ";

/// The device prints this once, when it can accept commands.
pub const READY_MARKER: &str = "READY-FOR-INPUT";

/// One bus command.
///
/// A command with no `data` byte is delivered to the device as data
/// for the most recently addressed register; the `address` field then
/// holds that data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub address: u8,
    pub data: Option<u8>,
}

impl Command {
    #[must_use]
    pub const fn new(address: u8, data: u8) -> Command {
        Command {
            address,
            data: Some(data),
        }
    }

    /// A one-byte command.
    #[must_use]
    pub const fn bare(byte: u8) -> Command {
        Command {
            address: byte,
            data: None,
        }
    }

    /// The frame sent over the transport, including the newline.
    #[must_use]
    pub fn frame(&self) -> String {
        format!("{self}\n")
    }

    /// Parse a received frame.  Surrounding whitespace (including the
    /// newline) is ignored.
    pub fn parse_frame(line: &str) -> Result<Command, WireError> {
        static RX_FRAME: OnceLock<Regex> = OnceLock::new();
        let rx = RX_FRAME.get_or_init(|| {
            compile("^(?<address>[0-9a-fA-F]{2})(?<data>[0-9a-fA-F]{2})?$")
        });
        let text = line.trim();
        let cap = rx
            .captures(text)
            .ok_or_else(|| WireError::MalformedCommand(text.to_string()))?;
        let address = hex_octet(&cap["address"])?;
        let data = cap.name("data").map(|m| hex_octet(m.as_str())).transpose()?;
        Ok(Command { address, data })
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self.data {
            Some(data) => write!(f, "{:02x}{:02x}", self.address, data),
            None => write!(f, "{:02x}", self.address),
        }
    }
}

/// Patterns are literals in this module, so failure here is a bug.
fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(rx) => rx,
        Err(e) => panic!("'{pattern}' is not a valid regular expression: {e}"),
    }
}

fn hex_octet(digits: &str) -> Result<u8, WireError> {
    u8::from_str_radix(digits, 16).map_err(|_| WireError::MalformedCommand(digits.to_string()))
}

/// The device's answer to one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Response {
    /// The command as echoed back by the device.
    pub command: Command,
    pub error_flag: bool,
    pub value: u8,
}

impl Response {
    #[must_use]
    pub const fn ok(command: Command, value: u8) -> Response {
        Response {
            command,
            error_flag: false,
            value,
        }
    }

    #[must_use]
    pub const fn error(command: Command, code: u8) -> Response {
        Response {
            command,
            error_flag: true,
            value: code,
        }
    }

    /// The response line, without a trailing newline.
    #[must_use]
    pub fn line(&self) -> String {
        format!(
            "{RESPONSE_MARKER}{} '{}' {}",
            self.command,
            u8::from(self.error_flag),
            self.value
        )
    }

    /// Parse a line from the device.
    ///
    /// Returns `Ok(None)` for lines which are not responses at all,
    /// and an error for lines which start with the response marker but
    /// do not continue with a well-formed response.
    pub fn parse_line(line: &str) -> Result<Option<Response>, WireError> {
        static RX_RESPONSE: OnceLock<Regex> = OnceLock::new();
        let rx = RX_RESPONSE.get_or_init(|| {
            compile(concat!(
                "^(?<echo>[0-9a-fA-F]{2}|[0-9a-fA-F]{4})",
                " '(?<flag>[01])'",
                " (?<value>[0-9]+)$",
            ))
        });
        let Some(rest) = line.strip_prefix(RESPONSE_MARKER) else {
            return Ok(None);
        };
        let rest = rest.trim_end();
        let malformed =
            || WireError::MalformedResponse(line.trim_end_matches(['\r', '\n']).to_string());
        let cap = rx.captures(rest).ok_or_else(malformed)?;
        let command = Command::parse_frame(&cap["echo"]).map_err(|_| malformed())?;
        let value: u8 = cap["value"].parse().map_err(|_| malformed())?;
        Ok(Some(Response {
            command,
            error_flag: &cap["flag"] == "1",
            value,
        }))
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&self.line())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    MalformedCommand(String),
    MalformedResponse(String),
}

impl Display for WireError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            WireError::MalformedCommand(text) => {
                write!(f, "malformed command frame '{text}'")
            }
            WireError::MalformedResponse(text) => {
                write!(f, "malformed response line '{text}'")
            }
        }
    }
}

impl Error for WireError {}

/// A line-oriented, half-duplex connection to the device.
pub trait Transport {
    /// Send one complete frame.
    fn write_frame(&mut self, frame: &str) -> io::Result<()>;

    /// Read the next line, without its line terminator.  `Ok(None)`
    /// means the device has gone away.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_frame(&mut self, frame: &str) -> io::Result<()> {
        (**self).write_frame(frame)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        (**self).read_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames() {
        assert_eq!(Command::new(236, 0x21).frame(), "ec21\n");
        assert_eq!(Command::bare(8).frame(), "08\n");
        assert_eq!(Command::new(0, 0).to_string(), "0000");
    }

    #[test]
    fn test_parse_frame() {
        assert_eq!(Command::parse_frame("ec21\n"), Ok(Command::new(236, 0x21)));
        assert_eq!(Command::parse_frame("  1d "), Ok(Command::bare(29)));
        assert_eq!(Command::parse_frame("AB"), Ok(Command::bare(0xab)));
        for bad in ["", "1", "123", "12345", "zz", "1g00"] {
            assert_eq!(
                Command::parse_frame(bad),
                Err(WireError::MalformedCommand(bad.to_string())),
                "frame {bad:?}"
            );
        }
    }

    #[test]
    #[should_panic(expected = "is not a valid regular expression")]
    fn test_compile_rejects_bad_pattern() {
        let _ = compile("(unclosed");
    }

    #[test]
    fn test_response_line() {
        let r = Response::ok(Command::new(236, 0x20), 0x18);
        assert_eq!(r.line(), "COLOSSUS-RESPONSE: ec20 '0' 24");
        let e = Response::error(Command::bare(0xfe), 9);
        assert_eq!(e.to_string(), "COLOSSUS-RESPONSE: fe '1' 9");
    }

    #[test]
    fn test_parse_response() {
        assert_eq!(
            Response::parse_line("COLOSSUS-RESPONSE: ec20 '0' 24\n"),
            Ok(Some(Response::ok(Command::new(236, 0x20), 24)))
        );
        assert_eq!(
            Response::parse_line("COLOSSUS-RESPONSE: 05 '1' 6"),
            Ok(Some(Response::error(Command::bare(5), 6)))
        );
        assert_eq!(Response::parse_line("READY-FOR-INPUT"), Ok(None));
        assert_eq!(Response::parse_line("booting..."), Ok(None));
    }

    #[test]
    fn test_parse_malformed_response() {
        for bad in [
            "COLOSSUS-RESPONSE: ",
            "COLOSSUS-RESPONSE: ec2 '0' 24",
            "COLOSSUS-RESPONSE: ec20 '2' 24",
            "COLOSSUS-RESPONSE: ec20 0 24",
            "COLOSSUS-RESPONSE: ec20 '0' 256",
            "COLOSSUS-RESPONSE: ec20 '0' -1",
            "COLOSSUS-RESPONSE: ec20 '0'",
        ] {
            assert_eq!(
                Response::parse_line(bad),
                Err(WireError::MalformedResponse(bad.to_string())),
                "line {bad:?}"
            );
        }
    }
}
