//! The 128-byte message header record.

use nom::{
    bytes::complete::take,
    combinator::all_consuming,
    number::complete::le_u16,
    sequence::tuple,
    IResult,
};
use qwk_types::{
    cp437,
    message::{ActiveFlag, MessageHeader, RECORD_LEN},
    report::{Anomaly, AnomalyKind, Location},
    status::MessageStatus,
};

use crate::datetime::{header_date, header_time};

/// A parsed header plus the field-level warnings it produced.
///
/// Warnings carry empty locations; the store walker fills in file, record
/// offset and message number.
#[derive(Debug)]
pub struct ParsedHeader {
    pub header: MessageHeader,
    pub warnings: Vec<Anomaly>,
}

/// The record-level plausibility check.
///
/// A header is plausible iff the status byte is a defined code, the
/// message-number field is blank or numeric, the block-count field is a
/// number of at least 1, and the active flag is `0xE1` or `0x00`. An
/// implausible record is misalignment evidence: the store walk stops,
/// because every subsequent record is suspect.
pub fn check_plausibility(record: &[u8; RECORD_LEN]) -> Result<(), String> {
    if MessageStatus::from_status_byte(record[0]).is_none() {
        return Err(format!(
            "status byte 0x{:02x} is not a defined code",
            record[0],
        ));
    }

    if !blank_or_numeric(&record[1..8]) {
        return Err("message-number field is neither blank nor numeric".into());
    }

    match numeric(&record[116..122]) {
        Some(blocks) if blocks >= 1 => {}
        _ => return Err("block-count field is not a number of at least 1".into()),
    }

    match record[122] {
        0xE1 | 0x00 => {}
        other => return Err(format!("active flag 0x{other:02x}")),
    }

    Ok(())
}

/// Parses a header record into fields.
///
/// Intended to run after [`check_plausibility`]; fields that still fail to
/// parse fall back to unspecified values and produce warnings rather than
/// errors.
pub fn parse_record(record: &[u8; RECORD_LEN]) -> ParsedHeader {
    let mut warnings = Vec::new();

    // Field widths per the QWK header layout. The tuple can't fail on a
    // 128-byte input.
    let fields: IResult<&[u8], _> = tuple((
        take(1usize),  // status
        take(7usize),  // message number
        take(8usize),  // MM-DD-YY
        take(5usize),  // HH:MM
        take(25usize), // to
        take(25usize), // from
        take(25usize), // subject
        take(12usize), // password
        take(8usize),  // reference number
        take(6usize),  // block count
        take(1usize),  // active flag
        le_u16,        // conference number
    ))(record.as_slice());

    let (_reserved, (status, number, date, time, to, from, subject, password, reference, blocks, active, conference)) =
        fields.expect("record is 128 bytes");

    let status = MessageStatus::from_status_byte(status[0]).unwrap_or_else(|| {
        warnings.push(field_warning(format!(
            "status byte 0x{:02x} is not a defined code",
            record[0],
        )));
        MessageStatus::PUBLIC
    });

    let number = match numeric_field(number) {
        Ok(number) => number,
        Err(()) => {
            warnings.push(field_warning("message-number field is not numeric"));
            None
        }
    };

    let date = if date.iter().all(|byte| *byte == b' ') {
        None
    } else {
        match all_consuming(header_date)(date) {
            Ok((_, Some(date))) => Some(date),
            _ => {
                warnings.push(field_warning(format!(
                    "invalid date field {:?}",
                    cp437::decode(date),
                )));
                None
            }
        }
    };

    let time = if time.iter().all(|byte| *byte == b' ') {
        None
    } else {
        match all_consuming(header_time)(time) {
            Ok((_, Some(time))) => Some(time),
            _ => {
                warnings.push(field_warning(format!(
                    "invalid time field {:?}",
                    cp437::decode(time),
                )));
                None
            }
        }
    };

    let reference = match numeric_field(reference) {
        Ok(reference) => reference,
        Err(()) => {
            warnings.push(field_warning("reference-number field is not numeric"));
            None
        }
    };

    let total_blocks = match numeric(blocks) {
        Some(blocks) => blocks as u32,
        None => {
            warnings.push(field_warning("block-count field is not numeric"));
            1
        }
    };

    ParsedHeader {
        header: MessageHeader {
            status,
            number,
            date,
            time,
            to: text_field(to),
            from: text_field(from),
            subject: text_field(subject),
            password: text_field(password),
            reference,
            total_blocks,
            active: ActiveFlag::from_byte(active[0]),
            conference,
            raw: *record,
        },
        warnings,
    }
}

fn field_warning(message: impl Into<String>) -> Anomaly {
    Anomaly::new(AnomalyKind::InvalidFieldFormat, Location::default(), message)
}

fn text_field(bytes: &[u8]) -> String {
    cp437::decode(bytes)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

fn trimmed(field: &[u8]) -> &[u8] {
    let start = field.iter().position(|byte| *byte != b' ');
    let end = field.iter().rposition(|byte| *byte != b' ');

    match (start, end) {
        (Some(start), Some(end)) => &field[start..=end],
        _ => &[],
    }
}

fn blank_or_numeric(field: &[u8]) -> bool {
    let digits = trimmed(field);

    digits.is_empty() || digits.iter().all(u8::is_ascii_digit)
}

fn numeric(field: &[u8]) -> Option<u64> {
    let digits = trimmed(field);

    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Blank is a valid "unspecified"; anything else must be numeric.
fn numeric_field(field: &[u8]) -> Result<Option<u32>, ()> {
    if trimmed(field).is_empty() {
        return Ok(None);
    }

    match numeric(field) {
        Some(value) => Ok(u32::try_from(value).map_err(drop).map(Some)?),
        None => Err(()),
    }
}
