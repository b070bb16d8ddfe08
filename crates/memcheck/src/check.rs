use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use memcheck_model::{Mismatch, Verifier, VerifyStats, WindowConfig};
use memcheck_trace::{ParsedTrace, TagReusePolicy, parse_trace};
use tracing::info;

use crate::Result;
use crate::report::{EXIT_FAILURE, EXIT_SUCCESS};

/// Settings for one checker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckConfig {
    pub window: WindowConfig,
    pub tag_reuse: TagReusePolicy,
}

/// Result of parsing and replaying one trace.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub trace: ParsedTrace,
    /// First diverging load. Replay only runs when parsing succeeded.
    pub mismatch: Option<Mismatch>,
    /// `None` when replay was skipped.
    pub verify: Option<VerifyStats>,
}

impl Outcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.trace.success() && self.mismatch.is_none()
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }
}

/// Parse and verify a log stream.
///
/// # Errors
///
/// Fails on an invalid window, I/O errors or an untokenizable line.
/// Protocol violations and data mismatches are part of the [`Outcome`].
pub fn check_reader<R: BufRead>(reader: R, config: &CheckConfig) -> Result<Outcome> {
    config.window.validate()?;

    let trace = parse_trace(reader, config.tag_reuse)?;
    if !trace.success() {
        info!("parse failed, skipping replay");
        return Ok(Outcome {
            trace,
            mismatch: None,
            verify: None,
        });
    }

    let mut verifier = Verifier::new(config.window)?;
    let mismatch = verifier.check(&trace.entries);
    Ok(Outcome {
        trace,
        mismatch,
        verify: Some(verifier.stats()),
    })
}

/// Parse and verify a log file.
///
/// # Errors
///
/// See [`check_reader`]; also fails if the file cannot be opened.
pub fn check_file(path: &Path, config: &CheckConfig) -> Result<Outcome> {
    let file = File::open(path).map_err(memcheck_trace::TraceError::from)?;
    check_reader(BufReader::new(file), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use memcheck_model::WindowError;
    use memcheck_trace::ReadData;

    fn run(log: &str) -> Outcome {
        check_reader(log.as_bytes(), &CheckConfig::default()).unwrap()
    }

    #[test]
    fn test_pass() {
        let outcome = run(
            "0 sw 20000000 deadbeef\n\
             1 lw 20000000 7\n\
             2 resp 7 deadbeef\n",
        );
        assert!(outcome.passed());
        assert_eq!(outcome.exit_code(), EXIT_SUCCESS);
        assert_eq!(outcome.verify.unwrap().checked_loads, 1);
    }

    #[test]
    fn test_mismatch() {
        let outcome = run(
            "0 sw 20000000 deadbeef\n\
             1 lw 20000000 7\n\
             2 resp 7 deadbef0\n",
        );
        assert!(!outcome.passed());
        assert_eq!(outcome.exit_code(), EXIT_FAILURE);
        let mismatch = outcome.mismatch.unwrap();
        assert_eq!(mismatch.expected, 0xdead_beef);
        assert_eq!(mismatch.observed(), ReadData::Resolved(0xdead_bef0));
    }

    #[test]
    fn test_parse_failure_skips_replay() {
        let outcome = run("0 resp 1 0\n1 lw 20000000 0\n2 resp 0 1\n");
        assert!(!outcome.passed());
        assert!(outcome.verify.is_none());
        assert!(outcome.mismatch.is_none());
    }

    #[test]
    fn test_orphan_fails_despite_later_correct_records() {
        let outcome = run(
            "0 resp 9 0\n\
             1 sw 20000000 1\n\
             2 lw 20000000 0\n\
             3 resp 0 1\n",
        );
        assert!(!outcome.passed());
        assert_eq!(outcome.trace.errors().count(), 1);
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let outcome = run("0 sw 20000001 1\n1 lw 20000002 0\n2 resp 0 0\n");
        assert_eq!(outcome.trace.warnings().count(), 2);
        assert!(outcome.passed());
    }

    #[test]
    fn test_strict_tags() {
        let config = CheckConfig {
            tag_reuse: TagReusePolicy::Strict,
            ..CheckConfig::default()
        };
        let log = "0 lw 20000000 1\n1 lw 20000004 1\n2 resp 1 0\n";
        let outcome = check_reader(log.as_bytes(), &config).unwrap();
        assert!(!outcome.passed());
        assert!(outcome.verify.is_none());
    }

    #[test]
    fn test_custom_window() {
        let config = CheckConfig {
            window: WindowConfig {
                base: 0x8000_0000,
                size: 0x1000,
            },
            ..CheckConfig::default()
        };
        // The default window is no longer modeled, so the bad value is ignored.
        let log = "0 sw 20000000 1\n1 lw 20000000 0\n2 resp 0 2\n\
                   3 sw 80000ffc 5\n4 lw 80000ffc 1\n5 resp 1 5\n";
        let outcome = check_reader(log.as_bytes(), &config).unwrap();
        assert!(outcome.passed());
        let stats = outcome.verify.unwrap();
        assert_eq!(stats.skipped_out_of_window, 2);
        assert_eq!(stats.checked_loads, 1);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let config = CheckConfig {
            window: WindowConfig { base: 0, size: 6 },
            ..CheckConfig::default()
        };
        let err = check_reader("".as_bytes(), &config).unwrap_err();
        assert!(matches!(err, Error::Window(WindowError::InvalidSize(6))));
    }

    #[test]
    fn test_file_with_invalid_window_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = CheckConfig {
            window: WindowConfig {
                base: 0x2000_0004,
                size: 0x1000,
            },
            ..CheckConfig::default()
        };
        let err = check_file(file.path(), &config).unwrap_err();
        assert!(matches!(
            err,
            Error::Window(WindowError::MisalignedBase(0x2000_0004))
        ));
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let log = b"0 sw 20000000 1\n1 lw 20000000 0\n2 resp 0 \xff\xfe\n";
        let err = check_reader(&log[..], &CheckConfig::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed record at line 3: line is not valid UTF-8"
        );
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/lsu.log");
        let err = check_file(path, &CheckConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Trace(memcheck_trace::TraceError::Io(_))
        ));
    }
}
