//! Kludge lines.
//!
//! A kludge is a metadata line carried at the head of a message body. QWKE
//! uses them to lift the 25-character To/From/Subject limits; Synchronet
//! `@`-kludges carry routing and identification data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single kludge line, with its exact source preserved.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Kludge {
    /// The key, as written. `@`-kludges keep their leading `@`.
    pub key: String,
    /// Everything after the first colon, with a single leading space removed.
    pub value: String,
    /// The exact source line.
    pub raw_line: String,
}

impl Kludge {
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        raw_line: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            raw_line: raw_line.into(),
        }
    }

    /// Whether this is one of the three QWKE extended-header kludges.
    pub fn is_qwke_header(&self) -> bool {
        ["to", "from", "subject"]
            .iter()
            .any(|key| self.key.eq_ignore_ascii_case(key))
    }
}
