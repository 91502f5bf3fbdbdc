//! Error-related types.

use thiserror::Error;

use crate::cp437::Cp437Error;

/// An error constructing a message header from fields.
///
/// Returned when a field cannot be represented in the fixed-width 128-byte
/// header record.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum HeaderFieldError {
    #[error("Message number {0} exceeds 9999999")]
    NumberTooLarge(u32),
    #[error("Reference number {0} exceeds 99999999")]
    ReferenceTooLarge(u32),
    #[error("Block count must be at least 1")]
    BlockCountZero,
    #[error("Field \"{field}\" is {len} characters, at most {max} fit the header")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error(transparent)]
    Unencodable(#[from] Cp437Error),
}
