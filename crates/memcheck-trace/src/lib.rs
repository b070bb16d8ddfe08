//! Load-store unit trace reader.
//!
//! Tokenizes the unit's event log and reconstructs, for every load and store
//! request, the read data it eventually received. Responses may complete out
//! of order; they are matched to requests through a fixed table of in-flight
//! tags, and a flush squashes every request still waiting.
//!
//! ```ignore
//! use memcheck_trace::{parse_trace_file, TagReusePolicy};
//!
//! let trace = parse_trace_file(path, TagReusePolicy::Permissive)?;
//! for diag in trace.errors() {
//!     eprintln!("{diag:?}");
//! }
//! ```

mod access;
mod builder;
mod diag;
mod entry;
mod record;
mod tags;

pub use access::{AccessKind, UnknownAccess};
pub use builder::{
    ParsedTrace, TagReusePolicy, TraceBuilder, TraceStats, parse_trace, parse_trace_file,
};
pub use diag::{Diagnostic, Severity};
pub use entry::{ReadData, TraceEntry};
pub use record::{Record, RecordError, RecordReader, parse_hex};
pub use tags::{TAG_COUNT, TagTable};

use thiserror::Error;

/// Errors that stop the log from being read at all.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record at line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: RecordError,
    },
}

pub type Result<T> = std::result::Result<T, TraceError>;
