//! Index files (`<conference>.NDX`).
//!
//! An index file holds one entry per message in a conference, each a 4-byte
//! MSBIN float encoding the record offset of the message's header within
//! the store. A historical 5-byte form appends a one-byte conference tag.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::message::RECORD_LEN;

/// One index entry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// One-based ordinal of the message within the conference.
    pub message_number: u32,
    /// Record offset of the message header within the store.
    pub record_offset: u32,
    /// The MSBIN float exactly as read, for byte-exact round-trips.
    pub raw: [u8; 4],
    /// The trailing tag byte of the 5-byte historical form.
    pub conference_tag: Option<u8>,
}

impl IndexEntry {
    /// The byte offset of the indexed header record.
    pub fn byte_offset(&self) -> u64 {
        u64::from(self.record_offset) * RECORD_LEN as u64
    }
}

/// A parsed index file.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexFile {
    pub file_name: String,
    /// Conference number taken from the file name, when it has one.
    pub conference: Option<u16>,
    pub entries: Vec<IndexEntry>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_byte_offset() {
        let entry = IndexEntry {
            message_number: 1,
            record_offset: 3,
            raw: [0; 4],
            conference_tag: None,
        };

        assert_eq!(entry.byte_offset(), 384);
    }
}
