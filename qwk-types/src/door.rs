//! The door identity file (`DOOR.ID`).

use std::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capabilities a mail door advertises in `DOOR.ID`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DoorCapabilities(u32);

impl DoorCapabilities {
    /// The door honours return receipts (`RECEIPT`).
    pub const RECEIPT: Self = Self(1);
    /// Mixed-case text is accepted (`MIXEDCASE = YES`).
    pub const MIXED_CASE: Self = Self(1 << 1);
    /// FidoNet tear/origin lines are handled (`FIDOTAG = YES`).
    pub const FIDO_TAG: Self = Self(1 << 2);
    /// `CONTROLTYPE = ADD`: conference subscription via control messages.
    pub const CONTROL_ADD: Self = Self(1 << 3);
    /// `CONTROLTYPE = DROP`.
    pub const CONTROL_DROP: Self = Self(1 << 4);
    /// `CONTROLTYPE = REQUEST`.
    pub const CONTROL_REQUEST: Self = Self(1 << 5);
    /// `CONTROLTYPE = RESET`.
    pub const CONTROL_RESET: Self = Self(1 << 6);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for DoorCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for DoorCapabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// The parsed door identity.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoorId {
    /// Required `DOOR` key: the producing door's name.
    pub door: String,
    /// Required `VERSION` key.
    pub version: String,
    /// Optional `SYSTEM` key: the BBS software.
    pub system: Option<String>,
    pub capabilities: DoorCapabilities,
    /// Every original line, verbatim, in file order.
    pub raw_lines: Vec<String>,
}
