//! The QWKE reader/door command file parsers.
//!
//! `TOREADER.EXT` carries commands from the door to the reader,
//! `TODOOR.EXT` the replies going back. One command per non-blank line;
//! each line splits at its first whitespace into a command type and
//! parameters, and the raw line is preserved verbatim.

use qwk_types::{
    cp437,
    ext::{ExtCommand, ExtFile},
};

/// The door-to-reader command file.
pub const TOREADER_FILE: &str = "TOREADER.EXT";

/// The reader-to-door command file.
pub const TODOOR_FILE: &str = "TODOOR.EXT";

/// Parses a command file.
pub fn parse(bytes: &[u8], file_name: &str) -> ExtFile {
    let lines = crate::text::split_lines(&cp437::decode(bytes));

    let commands = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (command, parameters) = match line.find(char::is_whitespace) {
                Some(at) => (&line[..at], line[at..].trim_start()),
                None => (line.as_str(), ""),
            };

            ExtCommand {
                command: command.to_string(),
                parameters: parameters.to_string(),
                raw_line: line.clone(),
            }
        })
        .collect();

    ExtFile {
        file_name: file_name.to_string(),
        commands,
        raw_lines: lines,
    }
}
