//! The message store walker.
//!
//! `MESSAGES.DAT` opens with a single 128-byte copyright record, then holds
//! each message as one header record followed by `total_blocks - 1` body
//! records. The walk is strictly ordered: header, validation, body
//! consumption, content construction, counter. Body records are consumed
//! even for messages that fail validation, because skipping them would
//! misalign every record that follows.

use std::io::Read;

use log::debug;
use qwk_types::{
    cp437,
    message::{Message, RECORD_LEN},
    options::PacketOptions,
    report::{Anomaly, AnomalyKind, Location, ValidationReport},
};

use crate::{
    error::QwkError,
    header,
    kludge,
    record::{RecordRead, RecordReader},
    validate::ValidationContext,
};

/// The canonical archive entry name.
pub const FILE_NAME: &str = "MESSAGES.DAT";

/// A single-pass iterator over the messages of a store.
///
/// The store is consumed from a stream, so the iterator is finite and
/// non-restartable; [`Packet`](crate::packet::Packet) materialises it into
/// an indexed collection on first traversal. Items are yielded in on-disk
/// order. After the first error item the iterator is fused.
#[derive(Debug)]
pub struct MessageStream<R> {
    records: RecordReader<R>,
    ctx: ValidationContext,
    max_blocks: u64,
    preamble_consumed: bool,
    finished: bool,
    processed: u32,
}

impl<R: Read> MessageStream<R> {
    pub fn new(source: R, options: &PacketOptions) -> Self {
        Self {
            records: RecordReader::new(source),
            ctx: ValidationContext::new(options.validation_mode),
            max_blocks: options.max_blocks_per_message(),
            preamble_consumed: false,
            finished: false,
            processed: 0,
        }
    }

    /// Messages consumed so far, including ones withheld by validation.
    pub fn processed(&self) -> u32 {
        self.processed
    }

    /// Bytes consumed from the store through complete records.
    pub fn bytes_consumed(&self) -> u64 {
        self.records.offset()
    }

    pub fn report(&self) -> &ValidationReport {
        self.ctx.report()
    }

    pub fn into_report(self) -> ValidationReport {
        self.ctx.into_report()
    }

    pub fn take_report(&mut self) -> ValidationReport {
        self.ctx.take_report()
    }

    /// Reads one record, converting truncation into a recorded fatal
    /// anomaly.
    fn read_record(&mut self, buf: &mut [u8; RECORD_LEN]) -> Result<RecordRead, QwkError> {
        match self.records.read_record(buf) {
            Ok(outcome) => Ok(outcome),
            Err(QwkError::TruncatedRecord {
                offset,
                wanted,
                got,
            }) => Err(self.ctx.fatal(Anomaly::new(
                AnomalyKind::TruncatedRecord,
                Location::at_record(FILE_NAME, offset),
                format!("wanted {wanted} bytes, got {got}"),
            ))),
            Err(error) => Err(error),
        }
    }

    fn next_message(&mut self) -> Result<Option<Message>, QwkError> {
        // The store begins with one copyright record. Its content is
        // irrelevant, but it must be consumed.
        if !self.preamble_consumed {
            let mut preamble = [0u8; RECORD_LEN];
            if self.read_record(&mut preamble)? == RecordRead::Eof {
                return Ok(None);
            }
            self.preamble_consumed = true;
        }

        loop {
            let record_offset = self.records.offset();

            // Header phase.
            let mut record = [0u8; RECORD_LEN];
            if self.read_record(&mut record)? == RecordRead::Eof {
                debug!("store ends cleanly after {} messages", self.processed);
                return Ok(None);
            }

            if let Err(reason) = header::check_plausibility(&record) {
                // Misalignment evidence. Recovery is not attempted: once
                // misaligned, every subsequent record is suspect.
                self.finished = true;
                self.ctx.error(Anomaly::new(
                    AnomalyKind::ImplausibleHeader,
                    Location::at_record(FILE_NAME, record_offset),
                    reason,
                ))?;
                return Ok(None);
            }

            let parsed = header::parse_record(&record);
            let message_number = parsed.header.number;

            for mut warning in parsed.warnings {
                warning.location.file = Some(FILE_NAME.to_string());
                warning.location.record_offset = Some(record_offset);
                warning.location.message_number = message_number;
                self.ctx.warn(warning);
            }

            // Validation phase.
            let body_blocks = u64::from(parsed.header.body_blocks());
            let over_limit = u64::from(parsed.header.total_blocks) > self.max_blocks;

            // Body phase, unconditional: an over-limit body is consumed
            // record by record so the stream stays aligned, just not kept.
            let body = if over_limit {
                let mut scratch = [0u8; RECORD_LEN];
                for _ in 0..body_blocks {
                    self.read_body_record(&mut scratch, record_offset, message_number)?;
                }
                None
            } else {
                let mut body = vec![0u8; body_blocks as usize * RECORD_LEN];
                for chunk in body.chunks_exact_mut(RECORD_LEN) {
                    let mut record = [0u8; RECORD_LEN];
                    self.read_body_record(&mut record, record_offset, message_number)?;
                    chunk.copy_from_slice(&record);
                }
                Some(body)
            };

            // Counter phase happens whether or not the message is yielded.
            self.processed += 1;

            if over_limit {
                self.ctx.error(Anomaly::new(
                    AnomalyKind::BlockCountExceedsLimit,
                    Location {
                        file: Some(FILE_NAME.to_string()),
                        record_offset: Some(record_offset),
                        message_number,
                        ..Location::default()
                    },
                    format!(
                        "{} blocks exceed the limit of {}",
                        parsed.header.total_blocks, self.max_blocks,
                    ),
                ))?;
                continue;
            }

            // Content phase.
            let raw_body = cp437::decode(&body.expect("body was read"));
            let lines = split_body_lines(&raw_body);
            let mut scan = kludge::scan(&lines);

            for mut warning in std::mem::take(&mut scan.warnings) {
                warning.location.file = Some(FILE_NAME.to_string());
                warning.location.record_offset = Some(record_offset);
                warning.location.message_number = message_number;
                self.ctx.warn(warning);
            }

            debug!(
                "message {:?} at offset {record_offset}: {} blocks, {} kludges",
                message_number,
                parsed.header.total_blocks,
                scan.kludges.len(),
            );

            return Ok(Some(Message {
                header: parsed.header,
                lines: scan.body,
                raw_body,
                kludges: scan.kludges,
                extended_to: scan.extended_to,
                extended_from: scan.extended_from,
                extended_subject: scan.extended_subject,
            }));
        }
    }

    /// A body record read; end of stream here means the store lied about
    /// the block count, which is indistinguishable from truncation.
    fn read_body_record(
        &mut self,
        buf: &mut [u8; RECORD_LEN],
        record_offset: u64,
        message_number: Option<u32>,
    ) -> Result<(), QwkError> {
        match self.read_record(buf)? {
            RecordRead::Full => Ok(()),
            RecordRead::Eof => Err(self.ctx.fatal(Anomaly::new(
                AnomalyKind::TruncatedRecord,
                Location {
                    file: Some(FILE_NAME.to_string()),
                    record_offset: Some(record_offset),
                    message_number,
                    ..Location::default()
                },
                "store ends inside a message body",
            ))),
        }
    }
}

impl<R: Read> Iterator for MessageStream<R> {
    type Item = Result<Message, QwkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_message() {
            Ok(Some(message)) => Some(Ok(message)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

/// Splits a decoded body into lines.
///
/// Lines are terminated by U+03C0, the decoded form of `0xE3`. A CR or
/// CRLF directly before a terminator belongs to the terminator. Trailing
/// space and NUL padding is stripped from the final segment; interior
/// segments are preserved verbatim, including empty ones.
pub fn split_body_lines(raw_body: &str) -> Vec<String> {
    let mut segments: Vec<&str> = raw_body.split(cp437::LINE_TERMINATOR).collect();

    if let Some(last) = segments.last_mut() {
        *last = last.trim_end_matches([' ', '\0']);
        if last.is_empty() {
            segments.pop();
        }
    }

    segments
        .into_iter()
        .map(|segment| {
            segment
                .strip_suffix("\r\n")
                .or_else(|| segment.strip_suffix('\r'))
                .or_else(|| segment.strip_suffix('\n'))
                .unwrap_or(segment)
                .to_string()
        })
        .collect()
}
