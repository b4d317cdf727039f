//! Print records, as emitted by the comparator into the printer
//! buffer.
//!
//! ## Layout
//!
//! | Octets | Contents                                 |
//! | ------ | ---------------------------------------- |
//! | 0      | Body id                                  |
//! | 1-12   | Stepping settings of wheels 0-11         |
//! | 13-22  | Counters 0-4, 16 bits each, little-endian |
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::wheels::{N_COUNTERS, N_WHEELS};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PrintRecord {
    /// Which body produced the record.
    pub body_id: u8,
    pub stepping_settings: [u8; N_WHEELS],
    pub counters: [u16; N_COUNTERS],
}

/// The printer buffer did not hold a whole number of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedRecord {
    pub buffer_len: usize,
}

impl Display for TruncatedRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "printer buffer holds {} octets, which is not a whole number of {}-octet records",
            self.buffer_len,
            PrintRecord::ENCODED_LEN
        )
    }
}

impl Error for TruncatedRecord {}

impl PrintRecord {
    pub const ENCODED_LEN: usize = 1 + N_WHEELS + 2 * N_COUNTERS;

    #[must_use]
    pub fn to_octets(&self) -> [u8; PrintRecord::ENCODED_LEN] {
        let mut out = [0u8; PrintRecord::ENCODED_LEN];
        out[0] = self.body_id;
        out[1..=N_WHEELS].copy_from_slice(&self.stepping_settings);
        for (i, counter) in self.counters.iter().enumerate() {
            let pos = 1 + N_WHEELS + 2 * i;
            out[pos..pos + 2].copy_from_slice(&counter.to_le_bytes());
        }
        out
    }

    #[must_use]
    pub fn from_octets(octets: &[u8; PrintRecord::ENCODED_LEN]) -> PrintRecord {
        let mut stepping_settings = [0u8; N_WHEELS];
        stepping_settings.copy_from_slice(&octets[1..=N_WHEELS]);
        let mut counters = [0u16; N_COUNTERS];
        for (i, counter) in counters.iter_mut().enumerate() {
            let pos = 1 + N_WHEELS + 2 * i;
            *counter = u16::from_le_bytes([octets[pos], octets[pos + 1]]);
        }
        PrintRecord {
            body_id: octets[0],
            stepping_settings,
            counters,
        }
    }

    /// Split a printer buffer into records.
    pub fn all_from_octets(octets: &[u8]) -> Result<Vec<PrintRecord>, TruncatedRecord> {
        let chunks = octets.chunks_exact(PrintRecord::ENCODED_LEN);
        if !chunks.remainder().is_empty() {
            return Err(TruncatedRecord {
                buffer_len: octets.len(),
            });
        }
        Ok(chunks
            .map(|chunk| {
                let mut record = [0u8; PrintRecord::ENCODED_LEN];
                record.copy_from_slice(chunk);
                PrintRecord::from_octets(&record)
            })
            .collect())
    }
}
