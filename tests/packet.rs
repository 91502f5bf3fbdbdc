//! End-to-end scenarios over whole packets and stores.

use qwk_codec::{
    archive::MemoryArchive,
    msbin,
    packet::Packet,
    store::MessageStream,
    testing::ChunkedReader,
    types::{
        message::{HeaderFields, MessageHeader, RECORD_LEN},
        report::AnomalyKind,
        options::PacketOptions,
    },
    QwkError,
};

const CONTROL: &[u8] = b"My BBS\r\n\
    Springfield\r\n\
    217-555-1212\r\n\
    Sysop Jones\r\n\
    1001,MYBBS\r\n\
    01-15-1994,20:15:32\r\n\
    JANE DOE\r\n\
    \r\n\
    0\r\n\
    1\r\n\
    0\r\n\
    0\r\n\
    Main Board\r\n";

fn header_record(number: u32, total_blocks: u32) -> [u8; RECORD_LEN] {
    MessageHeader::from_fields(HeaderFields {
        number: Some(number),
        to: "ALL".into(),
        from: "SYSOP".into(),
        subject: "Test".into(),
        total_blocks,
        ..HeaderFields::default()
    })
    .unwrap()
    .raw
}

fn body_record(content: &[u8]) -> [u8; RECORD_LEN] {
    assert!(content.len() <= RECORD_LEN);

    let mut record = [b' '; RECORD_LEN];
    record[..content.len()].copy_from_slice(content);
    record
}

/// One message, two blocks, body `"HELLO" CRLF 0xE3 "WORLD"` space-padded.
#[test]
fn single_message_store() {
    let mut store = vec![b' '; RECORD_LEN];
    store.extend_from_slice(&header_record(1, 2));
    store.extend_from_slice(&body_record(b"HELLO\r\n\xE3WORLD"));

    let mut archive = MemoryArchive::new();
    archive.insert("CONTROL.DAT", CONTROL.to_vec());
    archive.insert("MESSAGES.DAT", store.clone());

    let mut packet = Packet::open(archive, PacketOptions::default()).unwrap();
    let messages = packet.messages().unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].lines, ["HELLO", "WORLD"]);

    // The preserved header bytes are identical to the store input.
    assert_eq!(messages[0].header.raw, store[128..256]);
    assert!(!packet.report().has_errors());
}

/// A large store whose source returns bytes in 73-byte chunks must not
/// lose messages to misalignment.
#[test]
fn short_reads_do_not_lose_messages() {
    let mut store = vec![b' '; RECORD_LEN];
    for number in 1..=895 {
        store.extend_from_slice(&header_record(number, 2));
        let mut body = format!("MESSAGE {number}").into_bytes();
        body.push(0xE3);
        store.extend_from_slice(&body_record(&body));
    }

    let mut stream = MessageStream::new(
        ChunkedReader::new(store.as_slice(), 73),
        &PacketOptions::default(),
    );

    let messages: Vec<_> = stream.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(messages.len(), 895);
    assert_eq!(messages[0].header.number, Some(1));
    assert_eq!(messages[894].header.number, Some(895));
    assert!(!stream.report().has_errors());
}

/// Every chunked partition of the store parses identically to the
/// unpartitioned store.
#[test]
fn chunking_never_changes_the_result() {
    let mut store = vec![b' '; RECORD_LEN];
    store.extend_from_slice(&header_record(1, 2));
    store.extend_from_slice(&body_record(b"FIRST\xE3"));
    store.extend_from_slice(&header_record(2, 3));
    store.extend_from_slice(&body_record(b"SECOND, PART ONE\xE3"));
    store.extend_from_slice(&body_record(b"SECOND, PART TWO\xE3"));

    let options = PacketOptions::default();
    let expected: Vec<_> = MessageStream::new(store.as_slice(), &options)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(expected.len(), 2);

    for chunk in 1..RECORD_LEN {
        let got: Vec<_> =
            MessageStream::new(ChunkedReader::new(store.as_slice(), chunk), &options)
                .collect::<Result<_, _>>()
                .unwrap();

        assert_eq!(got, expected, "chunk size {chunk}");
    }
}

/// An over-limit message records an error but its body blocks are still
/// consumed, so the next message parses correctly.
#[test]
fn oversized_message_keeps_the_stream_aligned() {
    // With a 1 MB ceiling the limit is 8192 blocks.
    let options = PacketOptions {
        max_message_size_mb: 1,
        ..PacketOptions::default()
    };

    let oversized_blocks = 10_000u32;

    let mut store = vec![b' '; RECORD_LEN];
    store.extend_from_slice(&header_record(1, oversized_blocks));
    for _ in 0..oversized_blocks - 1 {
        store.extend_from_slice(&body_record(b"FILLER\xE3"));
    }
    store.extend_from_slice(&header_record(2, 2));
    store.extend_from_slice(&body_record(b"STILL HERE\xE3"));

    let mut stream = MessageStream::new(store.as_slice(), &options);
    let messages: Vec<_> = stream.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].header.number, Some(2));
    assert_eq!(messages[0].lines, ["STILL HERE"]);

    assert_eq!(stream.processed(), 2);
    assert_eq!(stream.bytes_consumed(), store.len() as u64);

    let errors = stream.report().errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, AnomalyKind::BlockCountExceedsLimit);
}

/// A QWKE long header is lifted from the body into the extended field.
#[test]
fn qwke_long_header_is_lifted() {
    let mut store = vec![b' '; RECORD_LEN];
    store.extend_from_slice(&header_record(1, 2));
    store.extend_from_slice(&body_record(
        b"To: Very Long Recipient Name Exceeding 25 Chars\xE3\xE3Hello there.\xE3",
    ));

    let mut stream = MessageStream::new(store.as_slice(), &PacketOptions::default());
    let message = stream.next().unwrap().unwrap();

    assert_eq!(message.kludges.len(), 1);
    assert_eq!(message.kludges[0].key, "To");
    assert_eq!(
        message.kludges[0].value,
        "Very Long Recipient Name Exceeding 25 Chars",
    );
    assert_eq!(
        message.extended_to.as_deref(),
        Some("Very Long Recipient Name Exceeding 25 Chars"),
    );
    assert_eq!(
        message.recipient(),
        "Very Long Recipient Name Exceeding 25 Chars",
    );
    assert_eq!(message.lines, ["Hello there."]);
}

/// A first line with a colon that is not a QWKE key stays in the body.
#[test]
fn colon_line_is_not_stripped() {
    let mut store = vec![b' '; RECORD_LEN];
    store.extend_from_slice(&header_record(1, 2));
    store.extend_from_slice(&body_record(b"Note: important.\xE3"));

    let mut stream = MessageStream::new(store.as_slice(), &PacketOptions::default());
    let message = stream.next().unwrap().unwrap();

    assert!(message.kludges.is_empty());
    assert_eq!(message.lines, ["Note: important."]);
}

/// A leading blank line without preceding kludges is body formatting.
#[test]
fn leading_blank_line_survives() {
    let mut store = vec![b' '; RECORD_LEN];
    store.extend_from_slice(&header_record(1, 2));
    store.extend_from_slice(&body_record(b"\xE3real text\xE3"));

    let mut stream = MessageStream::new(store.as_slice(), &PacketOptions::default());
    let message = stream.next().unwrap().unwrap();

    assert!(message.kludges.is_empty());
    assert_eq!(message.lines, ["", "real text"]);
}

/// A 400-byte index file yields 100 entries with 128-aligned byte offsets.
#[test]
fn index_file_offsets() {
    let mut store = vec![b' '; RECORD_LEN];
    let mut ndx = Vec::new();

    for number in 1..=100u32 {
        ndx.extend_from_slice(&msbin::from_record_offset(store.len() as u32 / 128));
        store.extend_from_slice(&header_record(number, 2));
        store.extend_from_slice(&body_record(b"X\xE3"));
    }
    assert_eq!(ndx.len(), 400);

    let mut archive = MemoryArchive::new();
    archive.insert("CONTROL.DAT", CONTROL.to_vec());
    archive.insert("MESSAGES.DAT", store);
    archive.insert("000.NDX", ndx);

    let mut packet = Packet::open(archive, PacketOptions::default()).unwrap();
    let index = packet.index(0).unwrap().unwrap();

    assert_eq!(index.entries.len(), 100);
    assert_eq!(index.entries[0].record_offset, 1);
    for entry in &index.entries {
        assert_eq!(entry.byte_offset(), u64::from(entry.record_offset) * 128);
    }
    assert!(!packet.report().has_errors());
}

/// Record alignment: consumed bytes equal `128 * (1 + sum of block counts)`.
#[test]
fn record_alignment() {
    let blocks = [2u32, 3, 2, 5];

    let mut store = vec![b' '; RECORD_LEN];
    for (number, total) in blocks.iter().enumerate() {
        store.extend_from_slice(&header_record(number as u32 + 1, *total));
        for _ in 0..total - 1 {
            store.extend_from_slice(&body_record(b"BODY\xE3"));
        }
    }

    let mut stream = MessageStream::new(store.as_slice(), &PacketOptions::default());
    let count = stream.by_ref().filter(Result::is_ok).count();

    assert_eq!(count, blocks.len());
    assert_eq!(
        stream.bytes_consumed(),
        128 * (1 + u64::from(blocks.iter().sum::<u32>())),
    );
}

/// Closing twice is a no-op after the first.
#[test]
fn close_is_idempotent() {
    let mut archive = MemoryArchive::new();
    archive.insert("CONTROL.DAT", CONTROL.to_vec());
    archive.insert("MESSAGES.DAT", vec![b' '; RECORD_LEN]);

    let mut packet = Packet::open(archive, PacketOptions::default()).unwrap();
    assert!(!packet.is_closed());

    packet.close();
    packet.close();
    assert!(packet.is_closed());
    assert!(matches!(packet.messages(), Err(QwkError::Closed)));
}
