//! Report lines and exit status.
//!
//! The checker's stdout contract:
//! - `WARN: misaligned <load|store> at line N (Tns)` per alignment finding
//! - `FAIL memcheck at line N (Tns): <reason>` per protocol error, then at
//!   most one data mismatch
//! - `PASS memcheck` when nothing failed

use std::fmt;

use memcheck_model::Mismatch;
use memcheck_trace::Diagnostic;

use crate::{Error, Outcome};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

const TOOL: &str = "memcheck";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Warn,
    Fail,
    Pass,
}

impl Status {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
            Self::Pass => "PASS",
        }
    }
}

/// One line of checker output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub status: Status,
    /// Everything after the status label.
    pub body: String,
}

impl ReportLine {
    fn warn(body: impl fmt::Display) -> Self {
        Self {
            status: Status::Warn,
            body: format!(": {body}"),
        }
    }

    fn fail_at(line: usize, time: u64, reason: impl fmt::Display) -> Self {
        Self {
            status: Status::Fail,
            body: format!(" {TOOL} at line {line} ({time}ns): {reason}"),
        }
    }

    fn pass() -> Self {
        Self {
            status: Status::Pass,
            body: format!(" {TOOL}"),
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.status.label(), self.body)
    }
}

/// Line for a parse-time diagnostic.
#[must_use]
pub fn diagnostic_line(diag: &Diagnostic) -> ReportLine {
    match diag {
        Diagnostic::Misaligned {
            line, time, kind, ..
        } => {
            let access = if kind.is_load() { "load" } else { "store" };
            ReportLine::warn(format!("misaligned {access} at line {line} ({time}ns)"))
        }
        Diagnostic::OrphanedResponse { line, time, .. } => {
            ReportLine::fail_at(*line, *time, "orphaned response")
        }
        Diagnostic::OrphanedRequest { line, time, .. } => {
            ReportLine::fail_at(*line, *time, "orphaned request")
        }
        Diagnostic::ReusedTag {
            line,
            time,
            tag,
            reissued_at,
        } => ReportLine::fail_at(
            *line,
            *time,
            format!("tag {tag} reissued at line {reissued_at} before response"),
        ),
    }
}

/// Line for the first data mismatch.
#[must_use]
pub fn mismatch_line(mismatch: &Mismatch) -> ReportLine {
    let entry = &mismatch.entry;
    ReportLine::fail_at(
        entry.line,
        entry.time,
        format!(
            "{} {:08x} (got {}, expected {:08x})",
            entry.kind,
            entry.addr,
            mismatch.observed(),
            mismatch.expected
        ),
    )
}

/// Line for an error that stopped the run.
#[must_use]
pub fn error_line(err: &Error) -> ReportLine {
    ReportLine {
        status: Status::Fail,
        body: format!(" {TOOL}: {err}"),
    }
}

/// All report lines for an outcome, in output order.
#[must_use]
pub fn report(outcome: &Outcome) -> Vec<ReportLine> {
    let mut lines: Vec<ReportLine> = outcome
        .trace
        .diagnostics
        .iter()
        .map(diagnostic_line)
        .collect();
    if let Some(mismatch) = &outcome.mismatch {
        lines.push(mismatch_line(mismatch));
    }
    if outcome.passed() {
        lines.push(ReportLine::pass());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CheckConfig, check_reader};
    use memcheck_trace::{AccessKind, ReadData, TraceEntry, TraceError};

    fn lines(log: &str) -> Vec<String> {
        let outcome = check_reader(log.as_bytes(), &CheckConfig::default()).unwrap();
        report(&outcome).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_pass_line() {
        let log = "0 sw 20000000 deadbeef\n1 lw 20000000 7\n2 resp 7 deadbeef\n";
        assert_eq!(lines(log), vec!["PASS memcheck"]);
    }

    #[test]
    fn test_mismatch_line() {
        let log = "0 sw 20000000 deadbeef\n1 lw 20000000 7\n2 resp 7 deadbef0\n";
        assert_eq!(
            lines(log),
            vec!["FAIL memcheck at line 2 (1ns): lw 20000000 (got deadbef0, expected deadbeef)"]
        );
    }

    #[test]
    fn test_no_response_marker() {
        let mismatch = Mismatch {
            entry: TraceEntry::load(4, 30, AccessKind::Lhu, 0x2000_0002, 0),
            expected: 0x1234,
        };
        assert_eq!(mismatch.observed(), ReadData::Unset);
        assert_eq!(
            mismatch_line(&mismatch).to_string(),
            "FAIL memcheck at line 4 (30ns): lhu 20000002 (got <no response>, expected 00001234)"
        );
    }

    #[test]
    fn test_diagnostics_in_order() {
        assert_eq!(
            lines(
                "0 lw 20000002 0\n\
                 1 resp 5 0\n\
                 2 sh 20000001 0\n\
                 3 lh 20000000 1\n"
            ),
            vec![
                "WARN: misaligned load at line 1 (0ns)",
                "FAIL memcheck at line 2 (1ns): orphaned response",
                "WARN: misaligned store at line 3 (2ns)",
                "FAIL memcheck at line 1 (0ns): orphaned request",
                "FAIL memcheck at line 4 (3ns): orphaned request",
            ]
        );
    }

    #[test]
    fn test_warning_with_pass() {
        assert_eq!(
            lines("5 lbcmp 20000004 0 0\n6 resp 0 ffffffff\n"),
            vec!["WARN: misaligned load at line 1 (5ns)", "PASS memcheck"]
        );
    }

    #[test]
    fn test_reused_tag_line() {
        let diag = Diagnostic::ReusedTag {
            line: 3,
            time: 10,
            tag: 2,
            reissued_at: 5,
        };
        assert_eq!(
            diagnostic_line(&diag).to_string(),
            "FAIL memcheck at line 3 (10ns): tag 2 reissued at line 5 before response"
        );
    }

    #[test]
    fn test_error_line() {
        let err = Error::Trace(TraceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        )));
        assert_eq!(
            error_line(&err).to_string(),
            "FAIL memcheck: IO error: no such file"
        );
    }
}
