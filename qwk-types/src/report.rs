//! Validation anomalies and the report that accumulates them.

use std::fmt::{Display, Formatter};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of anomaly was observed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    MissingRequiredField,
    InvalidFieldFormat,
    ImplausibleHeader,
    BlockCountExceedsLimit,
    EntryExceedsSizeLimit,
    TruncatedRecord,
    IndexMismatch,
    UnknownKludge,
    UnrecognisedControlLine,
}

impl Display for AnomalyKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            Self::MissingRequiredField => "missing required field",
            Self::InvalidFieldFormat => "invalid field format",
            Self::ImplausibleHeader => "implausible header",
            Self::BlockCountExceedsLimit => "block count exceeds limit",
            Self::EntryExceedsSizeLimit => "entry exceeds size limit",
            Self::TruncatedRecord => "truncated record",
            Self::IndexMismatch => "index mismatch",
            Self::UnknownKludge => "unknown kludge",
            Self::UnrecognisedControlLine => "unrecognised control line",
        };

        f.write_str(name)
    }
}

/// Where an anomaly was observed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    /// Archive entry name, e.g. `MESSAGES.DAT`.
    pub file: Option<String>,
    /// Byte offset of the record the anomaly belongs to.
    pub record_offset: Option<u64>,
    /// Message number, when known.
    pub message_number: Option<u32>,
    /// Zero-based line number within a text file or message body.
    pub line: Option<usize>,
}

impl Location {
    pub fn in_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    pub fn at_record(file: impl Into<String>, record_offset: u64) -> Self {
        Self {
            file: Some(file.into()),
            record_offset: Some(record_offset),
            ..Self::default()
        }
    }

    pub fn at_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
            ..Self::default()
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match &self.file {
            Some(file) => f.write_str(file)?,
            None => f.write_str("<unknown>")?,
        }

        if let Some(offset) = self.record_offset {
            write!(f, "@{offset}")?;
        }

        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }

        if let Some(number) = self.message_number {
            write!(f, " (message {number})")?;
        }

        Ok(())
    }
}

/// A single recorded anomaly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Error, PartialEq, Eq, Hash)]
#[error("{kind} in {location}: {message}")]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub location: Location,
    pub message: String,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }
}

/// The ordered lists of warnings and errors collected during a parse.
///
/// The report exists independently of whether the parse aborted; a caller
/// in lenient or salvage mode inspects it to judge packet quality.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    warnings: Vec<Anomaly>,
    errors: Vec<Anomaly>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> &[Anomaly] {
        &self.warnings
    }

    pub fn errors(&self) -> &[Anomaly] {
        &self.errors
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn record_warning(&mut self, anomaly: Anomaly) {
        self.warnings.push(anomaly);
    }

    pub fn record_error(&mut self, anomaly: Anomaly) {
        self.errors.push(anomaly);
    }

    /// Appends another report, preserving order.
    pub fn merge(&mut self, other: ValidationReport) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }
}
