//! memcheck - memory trace checker for out-of-order load-store units.
//!
//! Reads the event log captured from a load-store unit, pairs every load with
//! its response, replays the loads and stores against a reference RAM model
//! and reports the first load whose data diverges.
//!
//! # Example
//!
//! ```ignore
//! use memcheck::{CheckConfig, check_file, report};
//!
//! let outcome = check_file("lsu.log".as_ref(), &CheckConfig::default())?;
//! for line in report::report(&outcome) {
//!     println!("{line}");
//! }
//! std::process::exit(outcome.exit_code());
//! ```

pub use memcheck_model::{Mismatch, VerifyStats, WindowConfig, WindowError};
pub use memcheck_trace::{Diagnostic, ParsedTrace, TagReusePolicy, TraceError, TraceStats};

mod check;
pub mod metrics;
pub mod report;

pub use check::{CheckConfig, Outcome, check_file, check_reader};

use thiserror::Error;

/// Errors that prevent a trace from being checked at all.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error("invalid RAM window: {0}")]
    Window(#[from] WindowError),
}

pub type Result<T> = std::result::Result<T, Error>;
