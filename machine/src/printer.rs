//! The printer buffer, into which the comparator writes print
//! records.
use tracing::{Level, event};

/// The length is reported as a 16-bit quantity.
pub const CAPACITY: usize = 0xffff;

#[derive(Debug, Clone, Default)]
pub struct Printer {
    buffer: Vec<u8>,
    read_pos: usize,
}

impl Printer {
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.read_pos = 0;
    }

    /// Append octets; returns `false` (appending nothing) if they do
    /// not all fit.
    #[must_use]
    pub fn write(&mut self, octets: &[u8]) -> bool {
        if self.buffer.len() + octets.len() > CAPACITY {
            event!(
                Level::WARN,
                "printer buffer full, dropping {} octets",
                octets.len()
            );
            return false;
        }
        self.buffer.extend_from_slice(octets);
        true
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn rewind(&mut self) {
        self.read_pos = 0;
    }

    pub fn read_next(&mut self) -> Option<u8> {
        let octet = self.buffer.get(self.read_pos).copied()?;
        self.read_pos += 1;
        Some(octet)
    }
}

#[test]
fn test_write_and_read_back() {
    let mut p = Printer::default();
    assert!(p.is_empty());
    assert!(p.write(b"ABC"));
    assert_eq!(p.len(), 3);
    assert_eq!(p.read_next(), Some(b'A'));
    p.rewind();
    assert_eq!(p.read_next(), Some(b'A'));
    assert_eq!(p.read_next(), Some(b'B'));
    assert_eq!(p.read_next(), Some(b'C'));
    assert_eq!(p.read_next(), None);
    p.reset();
    assert!(p.is_empty());
    assert_eq!(p.read_next(), None);
}

#[test]
fn test_capacity() {
    let mut p = Printer::default();
    assert!(p.write(&vec![0u8; CAPACITY - 1]));
    assert!(!p.write(&[1, 2]));
    assert!(p.write(&[1]));
    assert_eq!(p.len(), CAPACITY);
}
