#![deny(missing_debug_implementations)]

//! # Codec for QWK offline mail packets
//!
//! QWK is the offline mail format of the BBS era: a compressed archive
//! holding a positional control manifest (`CONTROL.DAT`), one message store
//! of 128-byte records (`MESSAGES.DAT`), per-conference index files of
//! MSBIN offsets (`<N>.NDX`), and a handful of optional metadata files.
//! This crate parses, validates, and round-trips all of it, including the
//! QWKE extension for long headers.
//!
//! The archive container itself (ZIP and friends) is out of scope: the
//! packet consumes any [`Archive`](archive::Archive), a name-addressed
//! byte-stream producer.
//!
//! ## Example
//!
//! ```rust
//! use qwk_codec::{
//!     archive::MemoryArchive,
//!     packet::Packet,
//!     types::{codec::Encode, HeaderFields, Message, PacketOptions},
//! };
//!
//! let message = Message::compose(
//!     HeaderFields {
//!         number: Some(1),
//!         to: "JANE DOE".into(),
//!         from: "SYSOP".into(),
//!         subject: "Welcome".into(),
//!         ..HeaderFields::default()
//!     },
//!     vec!["HELLO".into(), "WORLD".into()],
//! )
//! .unwrap();
//!
//! // A store is one copyright record followed by the messages.
//! let mut store = vec![b' '; 128];
//! message.encode(&mut store).unwrap();
//!
//! let mut archive = MemoryArchive::new();
//! archive.insert(
//!     "CONTROL.DAT",
//!     b"My BBS\r\nSpringfield\r\n555-1212\r\nSysop\r\n0,MYBBS\r\n\
//!       01-15-1994,20:15:00\r\nJANE DOE\r\n\r\n0\r\n1\r\n0\r\n0\r\nMain\r\n"
//!         .to_vec(),
//! );
//! archive.insert("MESSAGES.DAT", store);
//!
//! let mut packet = Packet::open(archive, PacketOptions::default()).unwrap();
//!
//! let messages = packet.messages().unwrap();
//! assert_eq!(messages.len(), 1);
//! assert_eq!(messages[0].lines, ["HELLO", "WORLD"]);
//! assert!(!packet.report().has_errors());
//! ```

pub mod archive;
pub mod control;
pub mod datetime;
pub mod door;
pub mod error;
pub mod ext;
pub mod header;
pub mod index;
pub mod kludge;
pub mod msbin;
pub mod packet;
pub mod record;
pub mod rep;
pub mod store;
pub mod testing;
mod text;
pub mod validate;

pub use error::QwkError;
pub use packet::Packet;
pub use qwk_types;
pub use qwk_types as types;
