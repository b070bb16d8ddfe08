//! Tokenizer for load-store unit log records.
//!
//! One record per line, whitespace-separated:
//! - `<time> <lw|lh|lb|lhu|lbu> <hex_addr> <tag>`
//! - `<time> lbcmp <hex_addr> <hex_cmp_byte> <tag>`
//! - `<time> <sw|sh|sb> <hex_addr> <hex_data>`
//! - `<time> resp <tag> <hex_data>`
//! - `<time> flush`

use std::io::BufRead;
use std::str::SplitWhitespace;

use thiserror::Error;

use crate::access::AccessKind;
use crate::tags::TAG_COUNT;
use crate::{Result, TraceError};

/// A single tokenized log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    /// Load request occupying a tag until its response or a flush.
    Load {
        time: u64,
        kind: AccessKind,
        addr: u32,
        /// Compare byte for `lbcmp`, `None` for plain loads.
        operand: Option<u32>,
        tag: u8,
    },
    /// Store request. Stores never receive a response.
    Store {
        time: u64,
        kind: AccessKind,
        addr: u32,
        data: u32,
    },
    /// Read data returned for a tag.
    Response { time: u64, tag: u8, data: u32 },
    /// Pipeline squash of every outstanding load.
    Flush { time: u64 },
}

impl Record {
    /// Timestamp in nanoseconds.
    #[must_use]
    pub const fn time(&self) -> u64 {
        match self {
            Self::Load { time, .. }
            | Self::Store { time, .. }
            | Self::Response { time, .. }
            | Self::Flush { time } => *time,
        }
    }

    /// Parse one line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] describing the first field that could not be parsed.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, RecordError> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        let mut fields = Fields::new(line);

        let time = fields.decimal("time")?;
        let category = fields.next("category")?;

        let record = match category {
            "resp" => {
                let tag = fields.tag()?;
                let data = fields.hex("data")?;
                Self::Response { time, tag, data }
            }
            "flush" => Self::Flush { time },
            other => {
                let kind: AccessKind = other
                    .parse()
                    .map_err(|_| RecordError::UnknownCategory(other.to_string()))?;
                let addr = fields.hex("address")?;
                if kind.is_load() {
                    let operand = if kind == AccessKind::Lbcmp {
                        Some(fields.hex("compare byte")?)
                    } else {
                        None
                    };
                    let tag = fields.tag()?;
                    Self::Load {
                        time,
                        kind,
                        addr,
                        operand,
                        tag,
                    }
                } else {
                    let data = fields.hex("data")?;
                    Self::Store {
                        time,
                        kind,
                        addr,
                        data,
                    }
                }
            }
        };

        fields.finish()?;
        Ok(Some(record))
    }
}

/// Reasons a log line fails to tokenize.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unknown record category `{0}`")]
    UnknownCategory(String),
    #[error("invalid hex {field} `{value}`")]
    InvalidHex { field: &'static str, value: String },
    #[error("invalid decimal {field} `{value}`")]
    InvalidDecimal { field: &'static str, value: String },
    #[error("tag {0} out of range (0-{max})", max = TAG_COUNT - 1)]
    TagOutOfRange(u64),
    #[error("unexpected trailing field `{0}`")]
    TrailingField(String),
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// Cursor over the whitespace-separated fields of one line.
struct Fields<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            inner: line.split_whitespace(),
        }
    }

    fn next(&mut self, field: &'static str) -> std::result::Result<&'a str, RecordError> {
        self.inner.next().ok_or(RecordError::MissingField(field))
    }

    fn decimal(&mut self, field: &'static str) -> std::result::Result<u64, RecordError> {
        let value = self.next(field)?;
        value.parse().map_err(|_| RecordError::InvalidDecimal {
            field,
            value: value.to_string(),
        })
    }

    fn hex(&mut self, field: &'static str) -> std::result::Result<u32, RecordError> {
        let value = self.next(field)?;
        parse_hex(value).ok_or_else(|| RecordError::InvalidHex {
            field,
            value: value.to_string(),
        })
    }

    fn tag(&mut self) -> std::result::Result<u8, RecordError> {
        let tag = self.decimal("tag")?;
        u8::try_from(tag)
            .ok()
            .filter(|t| usize::from(*t) < TAG_COUNT)
            .ok_or(RecordError::TagOutOfRange(tag))
    }

    fn finish(mut self) -> std::result::Result<(), RecordError> {
        self.inner.next().map_or(Ok(()), |extra| {
            Err(RecordError::TrailingField(extra.to_string()))
        })
    }
}

/// Parse a 32-bit hex value with an optional `0x` prefix.
#[must_use]
pub fn parse_hex(value: &str) -> Option<u32> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Iterator over the records of a log, paired with 1-based line numbers.
///
/// Blank lines are skipped but still advance the line counter.
pub struct RecordReader<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> RecordReader<R> {
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<(usize, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(TraceError::Io(e))),
            }
            self.line += 1;
            let parsed = std::str::from_utf8(&self.buf)
                .map_err(|_| RecordError::InvalidUtf8)
                .and_then(Record::parse);
            match parsed {
                Ok(Some(record)) => return Some(Ok((self.line, record))),
                Ok(None) => {}
                Err(source) => {
                    return Some(Err(TraceError::Malformed {
                        line: self.line,
                        source,
                    }));
                }
            }
        }
    }
}
