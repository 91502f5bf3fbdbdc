#![deny(missing_debug_implementations)]

//! # Data types for QWK offline mail packets
//!
//! This crate provides the data model shared by everything that speaks the
//! QWK offline mail format: the control manifest, conferences, messages
//! (with their 128-byte header records preserved byte-for-byte), kludge
//! lines, QWKE extended headers, index entries, the DOOR.ID identity file,
//! and the reader/door command files.
//!
//! Byte-level parsing lives in the `qwk-codec` crate; this crate owns the
//! immutable structures, the CP437 text codec, and the [`Encode`](codec::Encode)
//! trait used to serialize every structure back to its on-disk form.

pub mod codec;
pub mod control;
pub mod cp437;
pub mod door;
pub mod error;
pub mod ext;
pub mod index;
pub mod kludge;
pub mod message;
pub mod options;
pub mod report;
pub mod status;
pub mod testing;
pub mod utils;

pub use control::{Conference, ControlDat};
pub use door::{DoorCapabilities, DoorId};
pub use ext::{ExtCommand, ExtFile};
pub use index::{IndexEntry, IndexFile};
pub use kludge::Kludge;
pub use message::{ActiveFlag, HeaderFields, Message, MessageHeader, RECORD_LEN};
pub use options::{Cp437Fallback, PacketOptions, ValidationMode};
pub use report::{Anomaly, AnomalyKind, Location, ValidationReport};
pub use status::MessageStatus;
