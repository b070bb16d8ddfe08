use std::fmt;

use crate::access::AccessKind;

/// Read data observed for a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadData {
    /// No response seen (yet).
    #[default]
    Unset,
    /// Response data returned by the unit.
    Resolved(u32),
    /// Squashed by a flush before any response arrived.
    Flushed,
}

impl ReadData {
    /// Resolved value, if any.
    #[must_use]
    pub const fn value(self) -> Option<u32> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unset | Self::Flushed => None,
        }
    }

    #[must_use]
    pub const fn is_flushed(self) -> bool {
        matches!(self, Self::Flushed)
    }
}

impl fmt::Display for ReadData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("<no response>"),
            Self::Resolved(value) => write!(f, "{value:08x}"),
            Self::Flushed => f.write_str("<flushed>"),
        }
    }
}

/// One memory request reconstructed from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// 1-based line of the request record.
    pub line: usize,
    /// Request timestamp in nanoseconds.
    pub time: u64,
    pub kind: AccessKind,
    pub addr: u32,
    /// Store data, or the compare byte for `lbcmp`. Zero for plain loads.
    pub write_data: u32,
    /// Response data. Always `Unset` for stores.
    pub read_data: ReadData,
}

impl TraceEntry {
    #[must_use]
    pub const fn load(line: usize, time: u64, kind: AccessKind, addr: u32, operand: u32) -> Self {
        Self {
            line,
            time,
            kind,
            addr,
            write_data: operand,
            read_data: ReadData::Unset,
        }
    }

    #[must_use]
    pub const fn store(line: usize, time: u64, kind: AccessKind, addr: u32, data: u32) -> Self {
        Self {
            line,
            time,
            kind,
            addr,
            write_data: data,
            read_data: ReadData::Unset,
        }
    }
}
