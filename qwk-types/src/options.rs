//! Configuration for opening and validating packets.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::message::RECORD_LEN;

/// How parse anomalies are handled.
///
/// Warnings are recorded in every mode. The modes differ in which anomalies
/// abort the parse:
///
/// | Mode | Errors | Aborts on |
/// |---|---|---|
/// | `Strict` | abort | any format violation |
/// | `Lenient` | recorded | unrecoverable format violations |
/// | `Salvage` | recorded | true I/O errors only |
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    Strict,
    #[default]
    Lenient,
    Salvage,
}

/// Fallback policy for a CP437 codec direction.
///
/// Decoding is total over all 256 bytes, so the policy only ever takes
/// effect when encoding text that contains characters outside CP437.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cp437Fallback {
    /// Fail on the first unmappable character.
    #[default]
    Strict,
    /// Substitute `?`.
    Replace,
    /// Drop the character.
    Skip,
}

/// Options accepted when opening a packet.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketOptions {
    pub validation_mode: ValidationMode,
    /// Per-message ceiling, in megabytes. One block is 128 bytes.
    pub max_message_size_mb: u32,
    /// Per-archive-entry ceiling, in megabytes.
    pub max_entry_size_mb: u32,
    pub cp437_fallback: Cp437Fallback,
}

impl Default for PacketOptions {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::default(),
            max_message_size_mb: 16,
            max_entry_size_mb: 100,
            cp437_fallback: Cp437Fallback::default(),
        }
    }
}

impl PacketOptions {
    /// The block-count limit derived from `max_message_size_mb`.
    pub fn max_blocks_per_message(&self) -> u64 {
        u64::from(self.max_message_size_mb) * 1024 * 1024 / RECORD_LEN as u64
    }

    /// The entry-size limit in bytes.
    pub fn max_entry_size(&self) -> u64 {
        u64::from(self.max_entry_size_mb) * 1024 * 1024
    }
}
