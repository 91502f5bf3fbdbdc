//! Reply packets.
//!
//! A REP packet is what a reader sends back to the board: an archive named
//! `<BBSID>.REP` holding a single `<BBSID>.MSG` file. The store layout is
//! the same 128-byte record format as `MESSAGES.DAT`, with one difference:
//! the opening record carries the BBS id (space-padded) instead of a
//! copyright notice, and doors check it against their own id before
//! accepting replies.

use std::io::{Read, Write};

use qwk_types::{
    codec::Encode,
    message::{Message, RECORD_LEN},
    options::PacketOptions,
    report::ValidationReport,
};

use crate::{error::QwkError, store::MessageStream};

/// A reply packet under construction.
#[derive(Debug, Clone, Default)]
pub struct RepPacket {
    bbs_id: String,
    messages: Vec<Message>,
}

impl RepPacket {
    pub fn new(bbs_id: impl Into<String>) -> Self {
        Self {
            bbs_id: bbs_id.into(),
            messages: Vec::new(),
        }
    }

    pub fn bbs_id(&self) -> &str {
        &self.bbs_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Adds a reply. Its conference number routes it on the board.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The name of the store entry inside the archive, `<BBSID>.MSG`.
    pub fn store_name(&self) -> String {
        format!("{}.MSG", self.bbs_id)
    }
}

impl Encode for RepPacket {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let mut preamble = [b' '; RECORD_LEN];
        let id = self.bbs_id.as_bytes();
        let len = id.len().min(RECORD_LEN);
        preamble[..len].copy_from_slice(&id[..len]);
        writer.write_all(&preamble)?;

        for message in &self.messages {
            message.encode(writer)?;
        }

        Ok(())
    }
}

/// Parses a reply store.
///
/// The record walk is identical to the message store's; only the preamble
/// differs, so the BBS id is read off the first record and the rest goes
/// through the regular stream.
pub fn parse<R: Read>(
    mut source: R,
    options: &PacketOptions,
) -> Result<(String, Vec<Message>, ValidationReport), QwkError> {
    let mut preamble = [0u8; RECORD_LEN];

    // An empty reply store is just an absent preamble.
    let mut filled = 0;
    while filled < RECORD_LEN {
        match source.read(&mut preamble[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error.into()),
        }
    }

    if filled == 0 {
        return Ok((String::new(), Vec::new(), ValidationReport::new()));
    }

    if filled < RECORD_LEN {
        return Err(QwkError::TruncatedRecord {
            offset: 0,
            wanted: RECORD_LEN,
            got: filled,
        });
    }

    let bbs_id = qwk_types::cp437::decode(&preamble)
        .trim_end_matches([' ', '\0'])
        .to_string();

    // The stream consumes its own preamble; feed it one blank record in
    // front of the remaining source.
    let blank = [b' '; RECORD_LEN];
    let mut stream = MessageStream::new(blank.as_slice().chain(source), options);

    let mut messages = Vec::new();
    for item in stream.by_ref() {
        messages.push(item?);
    }

    Ok((bbs_id, messages, stream.into_report()))
}
