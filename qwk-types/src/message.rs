//! Messages and their 128-byte header records.
//!
//! A message in the store is one header record followed by `total_blocks - 1`
//! body records. The parsed header keeps its raw record bytes alongside the
//! decoded fields; every field is derivable from the bytes, and the bytes are
//! what [`Encode`](crate::codec::Encode) writes back out.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    cp437,
    error::HeaderFieldError,
    kludge::Kludge,
    options::Cp437Fallback,
    status::MessageStatus,
};

/// The atomic unit of the message store.
pub const RECORD_LEN: usize = 128;

/// The largest message number the 7-character header field can carry.
pub const MAX_MESSAGE_NUMBER: u32 = 9_999_999;

/// The largest reference number the 8-character header field can carry.
pub const MAX_REFERENCE_NUMBER: u32 = 99_999_999;

const NAME_FIELD_LEN: usize = 25;
const PASSWORD_FIELD_LEN: usize = 12;

/// The active flag at header offset 122.
///
/// `0xE1` marks an active message. `0x00` appears in historical packets and
/// is taken to mean deleted. Anything else is preserved verbatim and makes
/// the header implausible.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActiveFlag {
    #[default]
    Active,
    Deleted,
    Other(u8),
}

impl ActiveFlag {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0xE1 => Self::Active,
            0x00 => Self::Deleted,
            other => Self::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Active => 0xE1,
            Self::Deleted => 0x00,
            Self::Other(byte) => byte,
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

#[cfg(feature = "serde")]
mod raw_record {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::RECORD_LEN;

    pub fn serialize<S: Serializer>(raw: &[u8; RECORD_LEN], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(raw.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; RECORD_LEN], D::Error> {
        let bytes = Vec::<u8>::deserialize(d)?;

        <[u8; RECORD_LEN]>::try_from(bytes)
            .map_err(|bytes| D::Error::custom(format!("expected 128 bytes, got {}", bytes.len())))
    }
}

/// A parsed 128-byte message header record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub status: MessageStatus,
    /// `None` when the field was entirely spaces.
    pub number: Option<u32>,
    /// `None` when the `MM-DD-YY` field was blank or invalid.
    pub date: Option<NaiveDate>,
    /// `None` when the `HH:MM` field was blank or invalid.
    pub time: Option<NaiveTime>,
    pub to: String,
    pub from: String,
    pub subject: String,
    pub password: String,
    pub reference: Option<u32>,
    /// Block count including the header record itself. At least 1.
    pub total_blocks: u32,
    pub active: ActiveFlag,
    pub conference: u16,
    /// The record exactly as it appeared in the store.
    #[cfg_attr(feature = "serde", serde(with = "raw_record"))]
    pub raw: [u8; RECORD_LEN],
}

/// Fields for building a header, used with [`MessageHeader::from_fields`].
///
/// A plain struct literal stands in for a builder; fill what you need and
/// take the rest from `Default`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub status: MessageStatus,
    pub number: Option<u32>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub to: String,
    pub from: String,
    pub subject: String,
    pub password: String,
    pub reference: Option<u32>,
    pub total_blocks: u32,
    pub active: ActiveFlag,
    pub conference: u16,
}

impl MessageHeader {
    /// Builds a header from fields, deriving the raw record.
    ///
    /// Validates everything the record can't represent: numbers beyond their
    /// field widths, a zero block count, over-long or non-CP437 text fields.
    pub fn from_fields(fields: HeaderFields) -> Result<Self, HeaderFieldError> {
        if let Some(number) = fields.number {
            if number > MAX_MESSAGE_NUMBER {
                return Err(HeaderFieldError::NumberTooLarge(number));
            }
        }

        if let Some(reference) = fields.reference {
            if reference > MAX_REFERENCE_NUMBER {
                return Err(HeaderFieldError::ReferenceTooLarge(reference));
            }
        }

        if fields.total_blocks == 0 {
            return Err(HeaderFieldError::BlockCountZero);
        }

        let mut raw = [b' '; RECORD_LEN];

        raw[0] = fields.status.to_status_byte();

        if let Some(number) = fields.number {
            raw[1..8].copy_from_slice(format!("{number:<7}").as_bytes());
        }

        if let Some(date) = fields.date {
            let formatted = format!(
                "{:02}-{:02}-{:02}",
                date.month(),
                date.day(),
                date.year().rem_euclid(100),
            );
            raw[8..16].copy_from_slice(formatted.as_bytes());
        }

        if let Some(time) = fields.time {
            let formatted = format!("{:02}:{:02}", time.hour(), time.minute());
            raw[16..21].copy_from_slice(formatted.as_bytes());
        }

        write_text_field(&mut raw[21..46], "to", &fields.to, NAME_FIELD_LEN)?;
        write_text_field(&mut raw[46..71], "from", &fields.from, NAME_FIELD_LEN)?;
        write_text_field(&mut raw[71..96], "subject", &fields.subject, NAME_FIELD_LEN)?;
        write_text_field(&mut raw[96..108], "password", &fields.password, PASSWORD_FIELD_LEN)?;

        if let Some(reference) = fields.reference {
            raw[108..116].copy_from_slice(format!("{reference:<8}").as_bytes());
        }

        raw[116..122].copy_from_slice(format!("{:<6}", fields.total_blocks).as_bytes());
        raw[122] = fields.active.to_byte();
        raw[123..125].copy_from_slice(&fields.conference.to_le_bytes());

        Ok(Self {
            status: fields.status,
            number: fields.number,
            date: fields.date,
            time: fields.time,
            to: fields.to,
            from: fields.from,
            subject: fields.subject,
            password: fields.password,
            reference: fields.reference,
            total_blocks: fields.total_blocks,
            active: fields.active,
            conference: fields.conference,
            raw,
        })
    }

    /// The number of 128-byte body records following the header.
    pub fn body_blocks(&self) -> u32 {
        self.total_blocks - 1
    }
}

fn write_text_field(
    target: &mut [u8],
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), HeaderFieldError> {
    let encoded = cp437::encode(value, Cp437Fallback::Strict)?;

    if encoded.len() > max {
        return Err(HeaderFieldError::FieldTooLong {
            field,
            len: encoded.len(),
            max,
        });
    }

    target[..encoded.len()].copy_from_slice(&encoded);

    Ok(())
}

/// A fully parsed message: header, body, kludges, QWKE extended headers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// Body lines with kludges removed.
    pub lines: Vec<String>,
    /// The decoded body exactly as stored, terminators and padding included.
    pub raw_body: String,
    pub kludges: Vec<Kludge>,
    pub extended_to: Option<String>,
    pub extended_from: Option<String>,
    pub extended_subject: Option<String>,
}

impl Message {
    /// Composes a new message from fields and body lines.
    ///
    /// `fields.total_blocks` is ignored and computed from the body. To, from
    /// and subject values longer than the 25-character header fields are
    /// lifted into QWKE kludge lines at the head of the body, with the
    /// header fields truncated.
    pub fn compose(
        mut fields: HeaderFields,
        lines: Vec<String>,
    ) -> Result<Self, HeaderFieldError> {
        let mut kludges = Vec::new();
        let mut extended_to = None;
        let mut extended_from = None;
        let mut extended_subject = None;

        for (key, field, extended) in [
            ("To", &mut fields.to, &mut extended_to),
            ("From", &mut fields.from, &mut extended_from),
            ("Subject", &mut fields.subject, &mut extended_subject),
        ] {
            if field.chars().count() > NAME_FIELD_LEN {
                let raw_line = format!("{key}: {field}");
                kludges.push(Kludge::new(key, field.clone(), raw_line));
                *extended = Some(field.clone());
                *field = field.chars().take(NAME_FIELD_LEN).collect();
            }
        }

        let mut body_lines: Vec<&str> = kludges.iter().map(|k| k.raw_line.as_str()).collect();
        if !kludges.is_empty() {
            body_lines.push("");
        }
        body_lines.extend(lines.iter().map(String::as_str));

        let mut raw_body = String::new();
        for line in &body_lines {
            raw_body.push_str(line);
            raw_body.push(cp437::LINE_TERMINATOR);
        }

        let encoded_len = cp437::encode(&raw_body, Cp437Fallback::Strict)?.len();
        fields.total_blocks = 1 + encoded_len.div_ceil(RECORD_LEN) as u32;

        let header = MessageHeader::from_fields(fields)?;

        Ok(Self {
            header,
            lines,
            raw_body,
            kludges,
            extended_to,
            extended_from,
            extended_subject,
        })
    }

    /// The recipient, preferring the QWKE extended header.
    pub fn recipient(&self) -> &str {
        self.extended_to.as_deref().unwrap_or(&self.header.to)
    }

    /// The sender, preferring the QWKE extended header.
    pub fn sender(&self) -> &str {
        self.extended_from.as_deref().unwrap_or(&self.header.from)
    }

    /// The subject, preferring the QWKE extended header.
    pub fn subject(&self) -> &str {
        self.extended_subject.as_deref().unwrap_or(&self.header.subject)
    }

    pub fn is_active(&self) -> bool {
        self.header.active.is_active()
    }

    pub fn conference(&self) -> u16 {
        self.header.conference
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fields() -> HeaderFields {
        HeaderFields {
            number: Some(1),
            to: "ALICE".into(),
            from: "BOB".into(),
            subject: "Hi".into(),
            total_blocks: 2,
            conference: 7,
            ..HeaderFields::default()
        }
    }

    #[test]
    fn test_from_fields_derives_record() {
        let header = MessageHeader::from_fields(fields()).unwrap();

        assert_eq!(header.raw[0], b' ');
        assert_eq!(&header.raw[1..8], b"1      ");
        assert_eq!(&header.raw[21..26], b"ALICE");
        assert_eq!(&header.raw[26..46], [b' '; 20]);
        assert_eq!(&header.raw[116..122], b"2     ");
        assert_eq!(header.raw[122], 0xE1);
        assert_eq!(&header.raw[123..125], &7u16.to_le_bytes());
        assert_eq!(header.body_blocks(), 1);
    }

    #[test]
    fn test_from_fields_date_time() {
        let header = MessageHeader::from_fields(HeaderFields {
            date: NaiveDate::from_ymd_opt(1994, 3, 5),
            time: NaiveTime::from_hms_opt(23, 45, 0),
            ..fields()
        })
        .unwrap();

        assert_eq!(&header.raw[8..16], b"03-05-94");
        assert_eq!(&header.raw[16..21], b"23:45");
    }

    #[test]
    fn test_from_fields_rejects_bad_input() {
        assert_eq!(
            MessageHeader::from_fields(HeaderFields {
                number: Some(10_000_000),
                ..fields()
            }),
            Err(HeaderFieldError::NumberTooLarge(10_000_000)),
        );

        assert_eq!(
            MessageHeader::from_fields(HeaderFields {
                total_blocks: 0,
                ..fields()
            }),
            Err(HeaderFieldError::BlockCountZero),
        );

        assert!(matches!(
            MessageHeader::from_fields(HeaderFields {
                subject: "x".repeat(26),
                ..fields()
            }),
            Err(HeaderFieldError::FieldTooLong {
                field: "subject",
                len: 26,
                max: 25,
            }),
        ));
    }

    #[test]
    fn test_compose_plain() {
        let message = Message::compose(
            fields(),
            vec!["HELLO".into(), "WORLD".into()],
        )
        .unwrap();

        assert!(message.kludges.is_empty());
        assert_eq!(message.raw_body, "HELLO\u{3C0}WORLD\u{3C0}");
        assert_eq!(message.header.total_blocks, 2);
    }

    #[test]
    fn test_compose_lifts_long_recipient() {
        let long = "Very Long Recipient Name Exceeding 25 Chars";
        let message = Message::compose(
            HeaderFields {
                to: long.into(),
                ..fields()
            },
            vec!["Hello there.".into()],
        )
        .unwrap();

        assert_eq!(message.header.to, "Very Long Recipient Name ");
        assert_eq!(message.extended_to.as_deref(), Some(long));
        assert_eq!(message.kludges.len(), 1);
        assert_eq!(message.kludges[0].key, "To");
        assert!(message.raw_body.starts_with("To: Very Long Recipient"));
    }

    #[test]
    fn test_active_flag() {
        assert_eq!(ActiveFlag::from_byte(0xE1), ActiveFlag::Active);
        assert_eq!(ActiveFlag::from_byte(0x00), ActiveFlag::Deleted);
        assert_eq!(ActiveFlag::from_byte(0x42), ActiveFlag::Other(0x42));
        assert_eq!(ActiveFlag::Other(0x42).to_byte(), 0x42);
    }
}
