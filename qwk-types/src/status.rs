//! Message status flags.

use std::{
    fmt::{Display, Formatter},
    ops::{BitAnd, BitOr, BitOrAssign},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The status of a message, as encoded in the first byte of its header record.
///
/// A status byte encodes a cross product of a privacy class (public, private,
/// comment to the sysop, sender-password protected, group-password protected)
/// and a read state, plus the lone "group password to all" form. The flags
/// are modeled as an opaque bit set so that combinations stay cheap to test
/// and copy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MessageStatus(u32);

impl MessageStatus {
    /// Public, unread. The absence of any other flag.
    pub const PUBLIC: Self = Self(0);
    /// Message is private to its addressee.
    pub const PRIVATE: Self = Self(1);
    /// Message has been read by its addressee.
    pub const READ: Self = Self(1 << 1);
    /// Comment to the sysop.
    pub const SYSOP: Self = Self(1 << 2);
    /// Protected by a sender password.
    pub const SENDER_PASSWORD: Self = Self(1 << 3);
    /// Protected by a group password.
    pub const GROUP_PASSWORD: Self = Self(1 << 4);
    /// Group-password message addressed to all.
    pub const TO_ALL: Self = Self(1 << 5);

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

    pub const fn is_private(self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub const fn is_read(self) -> bool {
        self.contains(Self::READ)
    }

    /// Decodes a header status byte.
    ///
    /// Returns `None` for bytes outside the defined set, which makes the
    /// containing header record implausible.
    pub fn from_status_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b' ' => Self::PUBLIC,
            b'-' => Self::READ,
            b'*' => Self::PRIVATE,
            b'+' => Self::PRIVATE.union(Self::READ),
            b'~' => Self::SYSOP,
            b'`' => Self::SYSOP.union(Self::READ),
            b'%' => Self::SENDER_PASSWORD,
            b'^' => Self::SENDER_PASSWORD.union(Self::READ),
            b'!' => Self::GROUP_PASSWORD,
            b'#' => Self::GROUP_PASSWORD.union(Self::READ),
            b'$' => Self::GROUP_PASSWORD.union(Self::TO_ALL),
            _ => return None,
        })
    }

    /// Encodes the canonical status byte for this flag set.
    ///
    /// The inverse of [`MessageStatus::from_status_byte`] for every value
    /// that function produces. Unknown combinations fall back to the public
    /// forms.
    pub fn to_status_byte(self) -> u8 {
        if self.contains(Self::TO_ALL) {
            b'$'
        } else if self.contains(Self::GROUP_PASSWORD) {
            if self.is_read() {
                b'#'
            } else {
                b'!'
            }
        } else if self.contains(Self::SENDER_PASSWORD) {
            if self.is_read() {
                b'^'
            } else {
                b'%'
            }
        } else if self.contains(Self::SYSOP) {
            if self.is_read() {
                b'`'
            } else {
                b'~'
            }
        } else if self.is_private() {
            if self.is_read() {
                b'+'
            } else {
                b'*'
            }
        } else if self.is_read() {
            b'-'
        } else {
            b' '
        }
    }
}

impl BitOr for MessageStatus {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for MessageStatus {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for MessageStatus {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Display for MessageStatus {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", char::from(self.to_status_byte()))
    }
}
