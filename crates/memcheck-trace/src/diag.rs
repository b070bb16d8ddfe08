//! Protocol diagnostics found while correlating requests and responses.

use crate::access::AccessKind;

/// Whether a diagnostic fails the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A protocol finding tied to a line of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Address not naturally aligned for its access width.
    Misaligned {
        line: usize,
        time: u64,
        kind: AccessKind,
        addr: u32,
    },
    /// Response for a tag with no pending request.
    OrphanedResponse { line: usize, time: u64, tag: u8 },
    /// Request still pending at end of log. Reports the request's own line.
    OrphanedRequest { line: usize, time: u64, tag: u8 },
    /// Tag reissued while its previous request was still pending.
    ///
    /// Only recorded under [`TagReusePolicy::Strict`](crate::TagReusePolicy::Strict);
    /// `line`/`time` are those of the displaced request.
    ReusedTag {
        line: usize,
        time: u64,
        tag: u8,
        reissued_at: usize,
    },
}

impl Diagnostic {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Misaligned { .. } => Severity::Warning,
            Self::OrphanedResponse { .. }
            | Self::OrphanedRequest { .. }
            | Self::ReusedTag { .. } => Severity::Error,
        }
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.severity(), Severity::Error)
    }

    /// Line the finding is reported against.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Misaligned { line, .. }
            | Self::OrphanedResponse { line, .. }
            | Self::OrphanedRequest { line, .. }
            | Self::ReusedTag { line, .. } => *line,
        }
    }

    #[must_use]
    pub const fn time(&self) -> u64 {
        match self {
            Self::Misaligned { time, .. }
            | Self::OrphanedResponse { time, .. }
            | Self::OrphanedRequest { time, .. }
            | Self::ReusedTag { time, .. } => *time,
        }
    }
}
