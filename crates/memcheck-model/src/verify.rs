//! Replay of trace entries against the reference memory.

use memcheck_trace::{AccessKind, ReadData, TraceEntry};
use tracing::{debug, info};

use crate::value::{cmp_result, load_result, store_result};
use crate::window::{MemoryWindow, WindowConfig, WindowError};

/// First load whose observed data disagrees with the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub entry: TraceEntry,
    /// Value the model predicts.
    pub expected: u32,
}

impl Mismatch {
    /// Data the unit actually returned.
    #[must_use]
    pub const fn observed(&self) -> ReadData {
        self.entry.read_data
    }
}

/// Replay counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifyStats {
    pub checked_loads: u64,
    pub applied_stores: u64,
    pub skipped_flushed: u64,
    /// Loads and stores outside the modeled window.
    pub skipped_out_of_window: u64,
}

/// Single-pass checker owning the reference memory.
#[derive(Debug)]
pub struct Verifier {
    memory: MemoryWindow,
    stats: VerifyStats,
}

impl Verifier {
    /// Verifier over a fresh zeroed window.
    ///
    /// # Errors
    ///
    /// Fails if the window configuration is invalid.
    pub fn new(config: WindowConfig) -> Result<Self, WindowError> {
        Ok(Self::with_memory(MemoryWindow::new(config)?))
    }

    /// Verifier over preloaded memory.
    #[must_use]
    pub fn with_memory(memory: MemoryWindow) -> Self {
        Self {
            memory,
            stats: VerifyStats::default(),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> VerifyStats {
        self.stats
    }

    /// Replay `entries` in order and stop at the first mismatching load.
    ///
    /// Stores update the model whether or not anything loads them later.
    /// Flushed loads and anything outside the window are skipped.
    pub fn check(&mut self, entries: &[TraceEntry]) -> Option<Mismatch> {
        for entry in entries {
            if entry.kind.is_store() {
                self.apply_store(entry);
                continue;
            }
            if entry.read_data.is_flushed() {
                self.stats.skipped_flushed += 1;
                continue;
            }
            let Some(expected) = self.expected(entry) else {
                debug!(
                    line = entry.line,
                    addr = entry.addr,
                    "load outside RAM window"
                );
                self.stats.skipped_out_of_window += 1;
                continue;
            };
            self.stats.checked_loads += 1;
            if entry.read_data != ReadData::Resolved(expected) {
                info!(line = entry.line, "first mismatch");
                return Some(Mismatch {
                    entry: entry.clone(),
                    expected,
                });
            }
        }
        info!(
            checked = self.stats.checked_loads,
            stores = self.stats.applied_stores,
            "replay complete"
        );
        None
    }

    /// Model value for a load, `None` when out of scope.
    fn expected(&self, entry: &TraceEntry) -> Option<u32> {
        if entry.kind == AccessKind::Lbcmp {
            cmp_result(entry, &self.memory)
        } else {
            self.memory
                .read(entry.addr)
                .map(|raw| load_result(entry, raw))
        }
    }

    fn apply_store(&mut self, entry: &TraceEntry) {
        match self.memory.read(entry.addr) {
            Some(raw) => {
                self.memory.write(entry.addr, store_result(entry, raw));
                self.stats.applied_stores += 1;
            }
            None => {
                debug!(
                    line = entry.line,
                    addr = entry.addr,
                    "store outside RAM window"
                );
                self.stats.skipped_out_of_window += 1;
            }
        }
    }
}

/// Replay `entries` against a fresh window.
///
/// # Errors
///
/// Fails if the window configuration is invalid.
pub fn check(
    entries: &[TraceEntry],
    config: WindowConfig,
) -> Result<(Option<Mismatch>, VerifyStats), WindowError> {
    let mut verifier = Verifier::new(config)?;
    let mismatch = verifier.check(entries);
    Ok((mismatch, verifier.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use memcheck_trace::{TagReusePolicy, parse_trace};

    fn replay(log: &str) -> (Option<Mismatch>, VerifyStats) {
        let trace = parse_trace(log.as_bytes(), TagReusePolicy::Permissive).unwrap();
        check(&trace.entries, WindowConfig::default()).unwrap()
    }

    #[test]
    fn test_store_load_pass() {
        let (mismatch, stats) = replay(
            "0 sw 20000000 deadbeef\n\
             1 lw 20000000 7\n\
             2 resp 7 deadbeef\n",
        );
        assert_eq!(mismatch, None);
        assert_eq!(stats.checked_loads, 1);
        assert_eq!(stats.applied_stores, 1);
    }

    #[test]
    fn test_store_load_mismatch() {
        let (mismatch, _) = replay(
            "0 sw 20000000 deadbeef\n\
             1 lw 20000000 7\n\
             2 resp 7 deadbef0\n",
        );
        let mismatch = mismatch.unwrap();
        assert_eq!(mismatch.entry.line, 2);
        assert_eq!(mismatch.expected, 0xdead_beef);
        assert_eq!(mismatch.observed(), ReadData::Resolved(0xdead_bef0));
    }

    #[test]
    fn test_replay_uses_file_order_not_response_order() {
        // The store lands between the two loads in file order even though
        // the first load's response arrives after it.
        let (mismatch, _) = replay(
            "0 lw 20000000 1\n\
             1 sw 20000000 5\n\
             2 lw 20000000 2\n\
             3 resp 2 5\n\
             4 resp 1 0\n",
        );
        assert_eq!(mismatch, None);
    }

    #[test]
    fn test_subword_stores_merge() {
        let (mismatch, _) = replay(
            "0 sw 20000010 11223344\n\
             1 sb 20000011 aa\n\
             2 sh 20000012 bbcc\n\
             3 lw 20000010 0\n\
             4 resp 0 bbccaa44\n",
        );
        assert_eq!(mismatch, None);
    }

    #[test]
    fn test_flushed_load_skipped() {
        let (mismatch, stats) = replay("0 lw 20000000 0\n1 flush\n");
        assert_eq!(mismatch, None);
        assert_eq!(stats.skipped_flushed, 1);
        assert_eq!(stats.checked_loads, 0);
    }

    #[test]
    fn test_out_of_window_never_checked() {
        let (mismatch, stats) = replay(
            "0 sw 10000000 1\n\
             1 lw 10000000 0\n\
             2 resp 0 ffffffff\n\
             3 lw 20400000 1\n\
             4 resp 1 12345678\n\
             5 lbcmp 203ffff8 0 2\n\
             6 resp 2 0\n",
        );
        assert_eq!(mismatch, None);
        assert_eq!(stats.skipped_out_of_window, 4);
    }

    #[test]
    fn test_unset_read_data_mismatches() {
        // Permissive tag reuse leaves the first load without a response.
        let (mismatch, _) = replay("0 lw 20000000 3\n1 lw 20000004 3\n2 resp 3 0\n");
        let mismatch = mismatch.unwrap();
        assert_eq!(mismatch.entry.line, 1);
        assert_eq!(mismatch.observed(), ReadData::Unset);
        assert_eq!(mismatch.expected, 0);
    }

    #[test]
    fn test_preloaded_memory() {
        let mut memory = MemoryWindow::new(WindowConfig::default()).unwrap();
        memory.write(0x2000_0040, 0xcafe_f00d);
        let mut verifier = Verifier::with_memory(memory);
        let log = "0 lhu 20000042 5\n1 resp 5 0000cafe\n";
        let trace = parse_trace(log.as_bytes(), TagReusePolicy::Permissive).unwrap();
        assert_eq!(verifier.check(&trace.entries), None);
        assert_eq!(verifier.stats().checked_loads, 1);
    }

    #[test]
    fn test_only_first_mismatch_reported() {
        let (mismatch, stats) = replay(
            "0 lw 20000000 0\n1 resp 0 1\n\
             2 lw 20000004 1\n3 resp 1 2\n",
        );
        assert_eq!(mismatch.unwrap().entry.line, 1);
        assert_eq!(stats.checked_loads, 1);
    }

    #[test]
    fn test_lbcmp_mask() {
        let (mismatch, _) = replay(
            "0 sw 20000040 000000aa\n\
             1 sw 20000044 0000aa00\n\
             2 sw 20000048 0000aa00\n\
             3 lbcmp 20000044 aa 4\n\
             4 resp 4 00000221\n",
        );
        assert_eq!(mismatch, None);
    }

    #[test]
    fn test_sign_extended_loads() {
        let (mismatch, _) = replay(
            "0 sw 20000000 00008080\n\
             1 lb 20000000 0\n2 resp 0 ffffff80\n\
             3 lbu 20000000 0\n4 resp 0 00000080\n\
             5 lh 20000000 0\n6 resp 0 ffff8080\n\
             7 lhu 20000000 0\n8 resp 0 00008080\n",
        );
        assert_eq!(mismatch, None);
    }

    #[test]
    fn test_invalid_window() {
        let err = check(&[], WindowConfig { base: 2, size: 8 }).unwrap_err();
        assert_eq!(err, WindowError::MisalignedBase(2));
    }
}
