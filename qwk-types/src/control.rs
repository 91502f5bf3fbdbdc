//! The control manifest (`CONTROL.DAT`).

use chrono::NaiveDateTime;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A conference the packet carries messages for.
///
/// Conference 0 is valid; many boards put their main board there.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conference {
    pub number: u16,
    pub name: String,
}

/// The parsed control manifest.
///
/// `CONTROL.DAT` is a positional, CRLF-terminated text file: eleven fixed
/// lines, then alternating conference number/name pairs, then optional
/// welcome/news/goodbye file names. Every original line is preserved in
/// [`raw_lines`](Self::raw_lines) so the manifest round-trips verbatim.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlDat {
    pub bbs_name: String,
    pub bbs_city: String,
    pub bbs_phone: String,
    pub sysop: String,
    pub registration_number: String,
    pub bbs_id: String,
    /// Packet creation time, `MM-DD-YYYY,HH:MM:SS`. `None` when invalid.
    pub created: Option<NaiveDateTime>,
    pub user_name: String,
    pub menu_file: String,
    pub netmail_conference: Option<u16>,
    pub total_messages: Option<u32>,
    pub conferences: Vec<Conference>,
    pub welcome_file: Option<String>,
    pub news_file: Option<String>,
    pub goodbye_file: Option<String>,
    /// Every original line, verbatim, in file order.
    pub raw_lines: Vec<String>,
}

impl ControlDat {
    pub fn conference(&self, number: u16) -> Option<&Conference> {
        self.conferences.iter().find(|c| c.number == number)
    }
}
