//! Exact-size record reads over a possibly short-reading byte source.

use std::io::{ErrorKind, Read};

use log::trace;

pub use qwk_types::message::RECORD_LEN;

use crate::error::QwkError;

/// The outcome of a record read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRead {
    /// The buffer was filled completely.
    Full,
    /// The source was already exhausted: zero bytes were read.
    Eof,
}

/// Reads exact-size records from a byte source.
///
/// The source is typically a decompression stream, and those may return
/// fewer bytes than requested even when more data remains. A single `read`
/// call therefore cannot be trusted to fill a record: it would silently
/// misalign the store, and every subsequent header would fail the
/// plausibility check. The reader loops until the buffer is full or the
/// source reports a genuine end of stream.
#[derive(Debug)]
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed so far through complete records.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads exactly `buf.len()` bytes.
    ///
    /// Returns [`RecordRead::Eof`] when the source was exhausted before the
    /// first byte, and [`QwkError::TruncatedRecord`] when it gave out
    /// part-way through the record.
    pub fn read_record(&mut self, buf: &mut [u8]) -> Result<RecordRead, QwkError> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(error) => return Err(error.into()),
            }
        }

        if filled == 0 {
            trace!("end of stream at offset {}", self.offset);
            return Ok(RecordRead::Eof);
        }

        if filled < buf.len() {
            return Err(QwkError::TruncatedRecord {
                offset: self.offset,
                wanted: buf.len(),
                got: filled,
            });
        }

        self.offset += filled as u64;

        Ok(RecordRead::Full)
    }
}
