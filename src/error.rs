//! Error-related types.

use qwk_types::{cp437::Cp437Error, report::Anomaly};
use thiserror::Error;

/// The error type for packet parsing.
///
/// Anomalies are recorded to the validation report first; only those the
/// configured mode decides to raise surface here, wrapped in
/// [`QwkError::Validation`].
#[derive(Debug, Error)]
pub enum QwkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A record ended mid-way: some bytes were read, then the stream ended.
    ///
    /// The store is defined to be an integer multiple of the record size, so
    /// this always aborts the store walk.
    #[error("Truncated record at offset {offset}: wanted {wanted} bytes, got {got}")]
    TruncatedRecord {
        offset: u64,
        wanted: usize,
        got: usize,
    },
    #[error(transparent)]
    Validation(#[from] Anomaly),
    #[error("Archive entry not found: {0}")]
    EntryNotFound(String),
    #[error(transparent)]
    Encode(#[from] Cp437Error),
    #[error("Packet is closed")]
    Closed,
}
