//! # Serialization of packet structures
//!
//! Every on-disk structure can be serialized back to bytes with the
//! [`Encode`](crate::codec::Encode) trait. Parsed structures round-trip
//! byte-exactly because they retain their raw form: headers keep their 128
//! record bytes, bodies keep the decoded text including padding, index
//! entries keep their MSBIN bytes, and the line-oriented files keep every
//! original line.
//!
//! ## Example
//!
//! ```rust
//! use qwk_types::{codec::Encode, HeaderFields, Message};
//!
//! let message = Message::compose(
//!     HeaderFields {
//!         number: Some(1),
//!         to: "ALICE".into(),
//!         from: "BOB".into(),
//!         subject: "Hi".into(),
//!         ..HeaderFields::default()
//!     },
//!     vec!["HELLO".into(), "WORLD".into()],
//! )
//! .unwrap();
//!
//! let bytes = message.encode_detached().unwrap();
//!
//! assert_eq!(bytes.len() % 128, 0);
//! ```

use std::io::{Error, ErrorKind, Write};

use crate::{
    control::ControlDat,
    cp437,
    door::DoorId,
    ext::ExtFile,
    index::{IndexEntry, IndexFile},
    message::{Message, MessageHeader, RECORD_LEN},
    options::Cp437Fallback,
};

pub trait Encode {
    #[must_use]
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()>;

    fn encode_detached(&self) -> std::io::Result<Vec<u8>> {
        let mut serialized = Vec::new();
        self.encode(&mut serialized)?;
        Ok(serialized)
    }
}

fn encode_cp437(text: &str) -> std::io::Result<Vec<u8>> {
    cp437::encode(text, Cp437Fallback::Strict)
        .map_err(|error| Error::new(ErrorKind::InvalidData, error))
}

fn write_lines(writer: &mut impl Write, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writer.write_all(&encode_cp437(line)?)?;
        writer.write_all(b"\r\n")?;
    }

    Ok(())
}

impl Encode for MessageHeader {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_all(&self.raw)
    }
}

impl Encode for Message {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        self.header.encode(writer)?;

        let body = encode_cp437(&self.raw_body)?;
        let capacity = self.header.body_blocks() as usize * RECORD_LEN;

        if body.len() > capacity {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "body is {} bytes but the header declares {} blocks",
                    body.len(),
                    self.header.total_blocks,
                ),
            ));
        }

        writer.write_all(&body)?;

        // Pad the final block with spaces.
        for _ in body.len()..capacity {
            writer.write_all(b" ")?;
        }

        Ok(())
    }
}

impl Encode for ControlDat {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        write_lines(writer, &self.raw_lines)
    }
}

impl Encode for DoorId {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        write_lines(writer, &self.raw_lines)
    }
}

impl Encode for ExtFile {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        write_lines(writer, &self.raw_lines)
    }
}

impl Encode for IndexEntry {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_all(&self.raw)?;

        if let Some(tag) = self.conference_tag {
            writer.write_all(&[tag])?;
        }

        Ok(())
    }
}

impl Encode for IndexFile {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        for entry in &self.entries {
            entry.encode(writer)?;
        }

        Ok(())
    }
}
