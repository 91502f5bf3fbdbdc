//! The QWKE reader/door command files (`TOREADER.EXT`, `TODOOR.EXT`).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One command line: the first whitespace-separated token and the rest.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtCommand {
    pub command: String,
    pub parameters: String,
    /// The exact source line.
    pub raw_line: String,
}

/// A parsed command file.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtFile {
    pub file_name: String,
    /// One entry per non-blank line, in file order.
    pub commands: Vec<ExtCommand>,
    /// Every original line, verbatim, blanks included.
    pub raw_lines: Vec<String>,
}
