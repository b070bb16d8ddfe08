//! Memory access categories emitted by the load-store unit.

use std::fmt;
use std::str::FromStr;

/// Category of a memory-referencing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Load word.
    Lw,
    /// Load halfword, sign-extended.
    Lh,
    /// Load byte, sign-extended.
    Lb,
    /// Load halfword, zero-extended.
    Lhu,
    /// Load byte, zero-extended.
    Lbu,
    /// Byte compare over a 32-byte window, producing a match mask.
    Lbcmp,
    /// Store word.
    Sw,
    /// Store halfword.
    Sh,
    /// Store byte.
    Sb,
}

impl AccessKind {
    /// All categories, loads first.
    pub const ALL: [Self; 9] = [
        Self::Lw,
        Self::Lh,
        Self::Lb,
        Self::Lhu,
        Self::Lbu,
        Self::Lbcmp,
        Self::Sw,
        Self::Sh,
        Self::Sb,
    ];

    /// Mnemonic as it appears in the log.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Lw => "lw",
            Self::Lh => "lh",
            Self::Lb => "lb",
            Self::Lhu => "lhu",
            Self::Lbu => "lbu",
            Self::Lbcmp => "lbcmp",
            Self::Sw => "sw",
            Self::Sh => "sh",
            Self::Sb => "sb",
        }
    }

    /// Whether the request waits for a response carrying read data.
    #[must_use]
    pub const fn is_load(self) -> bool {
        matches!(
            self,
            Self::Lw | Self::Lh | Self::Lb | Self::Lhu | Self::Lbu | Self::Lbcmp
        )
    }

    #[must_use]
    pub const fn is_store(self) -> bool {
        !self.is_load()
    }

    /// Required address alignment in bytes.
    ///
    /// `lbcmp` reads a 32-byte window but only requires 8-byte alignment.
    #[must_use]
    pub const fn alignment(self) -> u32 {
        match self {
            Self::Lw | Self::Sw => 4,
            Self::Lh | Self::Lhu | Self::Sh => 2,
            Self::Lb | Self::Lbu | Self::Sb => 1,
            Self::Lbcmp => 8,
        }
    }

    /// Whether `addr` is naturally aligned for this access.
    #[must_use]
    pub const fn is_aligned(self, addr: u32) -> bool {
        addr & (self.alignment() - 1) == 0
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Unrecognized access mnemonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAccess(pub String);

impl FromStr for AccessKind {
    type Err = UnknownAccess;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.mnemonic() == s)
            .ok_or_else(|| UnknownAccess(s.to_string()))
    }
}
