//! The index file parser.
//!
//! A `.NDX` file is a packed sequence of 4-byte MSBIN floats, one per
//! message, each encoding the record offset of a message header within the
//! store. A 5-byte historical form appends a one-byte conference tag. The
//! form is detected from the file length; a length divisible by both
//! resolves to the documented 4-byte form.

use qwk_types::{
    index::{IndexEntry, IndexFile},
    message::RECORD_LEN,
    report::{Anomaly, AnomalyKind, Location},
};

use crate::{error::QwkError, msbin, validate::ValidationContext};

/// Parses an index file.
///
/// The conference number is taken from the file name (`<N>.NDX`), when it
/// has one.
pub fn parse(
    bytes: &[u8],
    file_name: &str,
    ctx: &mut ValidationContext,
) -> Result<IndexFile, QwkError> {
    let mut index = IndexFile {
        file_name: file_name.to_string(),
        conference: conference_of(file_name),
        entries: Vec::new(),
    };

    if bytes.is_empty() {
        return Ok(index);
    }

    let stride = if bytes.len() % 4 == 0 {
        4
    } else if bytes.len() % 5 == 0 {
        5
    } else {
        ctx.error(Anomaly::new(
            AnomalyKind::InvalidFieldFormat,
            Location::in_file(file_name),
            format!(
                "length {} is divisible by neither 4 nor 5",
                bytes.len(),
            ),
        ))?;
        return Ok(index);
    };

    for (ordinal, chunk) in bytes.chunks_exact(stride).enumerate() {
        let raw = <[u8; 4]>::try_from(&chunk[..4]).expect("chunk holds at least 4 bytes");

        let Some(record_offset) = msbin::record_offset(raw) else {
            ctx.warn(Anomaly::new(
                AnomalyKind::InvalidFieldFormat,
                Location {
                    file: Some(file_name.to_string()),
                    record_offset: Some((ordinal * stride) as u64),
                    ..Location::default()
                },
                format!("entry {} encodes a negative record offset", ordinal + 1),
            ));
            continue;
        };

        index.entries.push(IndexEntry {
            message_number: ordinal as u32 + 1,
            record_offset,
            raw,
            conference_tag: (stride == 5).then(|| chunk[4]),
        });
    }

    Ok(index)
}

/// Cross-checks entries against the store length.
///
/// Every indexed header record must lie entirely within the store.
pub fn cross_check(
    index: &IndexFile,
    store_len: u64,
    ctx: &mut ValidationContext,
) -> Result<(), QwkError> {
    for entry in &index.entries {
        if entry.byte_offset() + RECORD_LEN as u64 > store_len {
            ctx.error(Anomaly::new(
                AnomalyKind::IndexMismatch,
                Location {
                    file: Some(index.file_name.clone()),
                    message_number: Some(entry.message_number),
                    ..Location::default()
                },
                format!(
                    "record offset {} points past the {store_len}-byte store",
                    entry.record_offset,
                ),
            ))?;
        }
    }

    Ok(())
}

fn conference_of(file_name: &str) -> Option<u16> {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem)
        .parse()
        .ok()
}
