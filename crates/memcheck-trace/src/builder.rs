//! Request/response correlation.
//!
//! Walks the records in file order, allocating one [`TraceEntry`] per request
//! and resolving load read data through the [`TagTable`]. Protocol violations
//! are accumulated as [`Diagnostic`]s rather than aborting the scan.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::Result;
use crate::access::AccessKind;
use crate::diag::Diagnostic;
use crate::entry::{ReadData, TraceEntry};
use crate::record::{Record, RecordReader};
use crate::tags::TagTable;

/// How to treat a load issued on a tag that is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagReusePolicy {
    /// Overwrite the slot. The displaced entry keeps `Unset` read data.
    #[default]
    Permissive,
    /// Overwrite the slot and record [`Diagnostic::ReusedTag`].
    Strict,
}

/// Record counts gathered while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    pub records: u64,
    pub loads: u64,
    pub stores: u64,
    pub responses: u64,
    pub flushes: u64,
    /// Loads squashed by a flush.
    pub flushed: u64,
}

/// Output of the correlation pass.
#[derive(Debug, Clone, Default)]
pub struct ParsedTrace {
    /// Entries in request order.
    pub entries: Vec<TraceEntry>,
    /// Findings in the order they were detected.
    pub diagnostics: Vec<Diagnostic>,
    pub stats: TraceStats,
}

impl ParsedTrace {
    /// True when no fatal diagnostic was recorded.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_fatal())
    }
}

/// Incremental trace builder.
#[derive(Debug, Default)]
pub struct TraceBuilder {
    policy: TagReusePolicy,
    entries: Vec<TraceEntry>,
    tags: TagTable,
    diagnostics: Vec<Diagnostic>,
    stats: TraceStats,
}

impl TraceBuilder {
    #[must_use]
    pub fn new(policy: TagReusePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Apply one record found at `line`.
    pub fn push(&mut self, line: usize, record: Record) {
        self.stats.records += 1;
        match record {
            Record::Load {
                time,
                kind,
                addr,
                operand,
                tag,
            } => {
                self.stats.loads += 1;
                self.check_alignment(line, time, kind, addr);
                let index = self.entries.len();
                self.entries.push(TraceEntry::load(
                    line,
                    time,
                    kind,
                    addr,
                    operand.unwrap_or(0),
                ));
                if let Some(displaced) = self.tags.occupy(tag, index) {
                    self.reused(tag, displaced, line);
                }
            }
            Record::Store {
                time,
                kind,
                addr,
                data,
            } => {
                self.stats.stores += 1;
                self.check_alignment(line, time, kind, addr);
                self.entries
                    .push(TraceEntry::store(line, time, kind, addr, data));
            }
            Record::Response { time, tag, data } => {
                self.stats.responses += 1;
                if let Some(index) = self.tags.release(tag) {
                    self.entries[index].read_data = ReadData::Resolved(data);
                } else {
                    debug!(line, tag, "response without pending request");
                    self.diagnostics
                        .push(Diagnostic::OrphanedResponse { line, time, tag });
                }
            }
            Record::Flush { .. } => {
                self.stats.flushes += 1;
                let pending: Vec<usize> = self.tags.drain().collect();
                debug!(line, squashed = pending.len(), "flush");
                for index in pending {
                    self.entries[index].read_data = ReadData::Flushed;
                    self.stats.flushed += 1;
                }
            }
        }
    }

    /// Report requests still waiting on a tag and return the result.
    #[must_use]
    pub fn finish(mut self) -> ParsedTrace {
        for (tag, index) in self.tags.pending() {
            let entry = &self.entries[index];
            self.diagnostics.push(Diagnostic::OrphanedRequest {
                line: entry.line,
                time: entry.time,
                tag,
            });
        }

        let trace = ParsedTrace {
            entries: self.entries,
            diagnostics: self.diagnostics,
            stats: self.stats,
        };
        info!(
            entries = trace.entries.len(),
            errors = trace.errors().count(),
            warnings = trace.warnings().count(),
            "trace parsed"
        );
        trace
    }

    fn check_alignment(&mut self, line: usize, time: u64, kind: AccessKind, addr: u32) {
        if !kind.is_aligned(addr) {
            self.diagnostics.push(Diagnostic::Misaligned {
                line,
                time,
                kind,
                addr,
            });
        }
    }

    fn reused(&mut self, tag: u8, displaced: usize, line: usize) {
        let prior = &self.entries[displaced];
        debug!(
            tag,
            prior_line = prior.line,
            line,
            "tag reissued while pending"
        );
        if self.policy == TagReusePolicy::Strict {
            self.diagnostics.push(Diagnostic::ReusedTag {
                line: prior.line,
                time: prior.time,
                tag,
                reissued_at: line,
            });
        }
    }
}

/// Build a trace from a log stream.
///
/// # Errors
///
/// Fails on I/O errors or a line that cannot be tokenized. Protocol
/// violations are returned as diagnostics instead.
pub fn parse_trace<R: BufRead>(reader: R, policy: TagReusePolicy) -> Result<ParsedTrace> {
    let mut builder = TraceBuilder::new(policy);
    for item in RecordReader::new(reader) {
        let (line, record) = item?;
        builder.push(line, record);
    }
    Ok(builder.finish())
}

/// Build a trace from a log file.
///
/// # Errors
///
/// See [`parse_trace`]; also fails if the file cannot be opened.
pub fn parse_trace_file(path: &Path, policy: TagReusePolicy) -> Result<ParsedTrace> {
    let file = File::open(path)?;
    parse_trace(BufReader::new(file), policy)
}
