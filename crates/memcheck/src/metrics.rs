//! Run counters using metrics-rs.
//!
//! Counters are always recorded through the `metrics` facade; they only go
//! anywhere when a recorder is installed, e.g. [`CliRecorder`] under
//! `--metrics`.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter,
};
use parking_lot::RwLock;

use crate::{Outcome, TraceStats, VerifyStats};

// ============================================================================
// Metric descriptions
// ============================================================================

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!("memcheck_records_total", Unit::Count, "Log records parsed");
    describe_counter!("memcheck_loads_total", Unit::Count, "Load requests");
    describe_counter!("memcheck_stores_total", Unit::Count, "Store requests");
    describe_counter!("memcheck_responses_total", Unit::Count, "Load responses");
    describe_counter!("memcheck_flushes_total", Unit::Count, "Pipeline flushes");
    describe_counter!(
        "memcheck_flushed_loads_total",
        Unit::Count,
        "Loads squashed by a flush"
    );
    describe_counter!(
        "memcheck_checked_loads_total",
        Unit::Count,
        "Loads compared against the model"
    );
    describe_counter!(
        "memcheck_out_of_window_total",
        Unit::Count,
        "Accesses outside the RAM window"
    );
    describe_counter!("memcheck_warnings_total", Unit::Count, "Alignment warnings");
    describe_counter!("memcheck_errors_total", Unit::Count, "Protocol errors");
    describe_counter!("memcheck_mismatches_total", Unit::Count, "Data mismatches");
}

// ============================================================================
// Metric recording functions
// ============================================================================

/// Record parse-phase counts.
pub fn record_trace(stats: &TraceStats) {
    counter!("memcheck_records_total").absolute(stats.records);
    counter!("memcheck_loads_total").absolute(stats.loads);
    counter!("memcheck_stores_total").absolute(stats.stores);
    counter!("memcheck_responses_total").absolute(stats.responses);
    counter!("memcheck_flushes_total").absolute(stats.flushes);
    counter!("memcheck_flushed_loads_total").absolute(stats.flushed);
}

/// Record replay-phase counts.
pub fn record_verify(stats: &VerifyStats) {
    counter!("memcheck_checked_loads_total").absolute(stats.checked_loads);
    counter!("memcheck_out_of_window_total").absolute(stats.skipped_out_of_window);
}

/// Record everything known about a finished run.
pub fn record_outcome(outcome: &Outcome) {
    record_trace(&outcome.trace.stats);
    if let Some(stats) = &outcome.verify {
        record_verify(stats);
    }
    counter!("memcheck_warnings_total").absolute(outcome.trace.warnings().count() as u64);
    counter!("memcheck_errors_total").absolute(outcome.trace.errors().count() as u64);
    counter!("memcheck_mismatches_total").absolute(u64::from(outcome.mismatch.is_some()));
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

#[derive(Default)]
struct CounterStorage {
    values: RwLock<HashMap<String, u64>>,
}

struct CliCounter {
    key: String,
    storage: Arc<CounterStorage>,
}

impl metrics::CounterFn for CliCounter {
    fn increment(&self, value: u64) {
        let mut values = self.storage.values.write();
        *values.entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        let mut values = self.storage.values.write();
        values.insert(self.key.clone(), value);
    }
}

/// Recorder that keeps counters in memory for a terminal summary.
///
/// Gauges and histograms are not used by the checker and are discarded.
pub struct CliRecorder {
    counters: Arc<CounterStorage>,
}

impl CliRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: Arc::new(CounterStorage::default()),
        }
    }

    /// Install as the global recorder.
    ///
    /// Returns `None` if another recorder is already installed.
    #[must_use]
    pub fn install(self) -> Option<CliRecorderHandle> {
        let counters = Arc::clone(&self.counters);
        metrics::set_global_recorder(self).ok()?;
        Some(CliRecorderHandle { counters })
    }
}

impl Default for CliRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn key_to_string(key: &Key) -> String {
    let name = key.name();
    let labels = key.labels();
    if labels.len() == 0 {
        name.to_string()
    } else {
        let label_str: Vec<String> = labels
            .map(|l| format!("{}={}", l.key(), l.value()))
            .collect();
        format!("{}{{{}}}", name, label_str.join(","))
    }
}

impl Recorder for CliRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CliCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.counters),
        }))
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, _key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::noop()
    }
}

/// Handle for reading counters after the recorder is installed.
pub struct CliRecorderHandle {
    counters: Arc<CounterStorage>,
}

impl CliRecorderHandle {
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.counters.values.read().get(key).copied()
    }

    /// Summary lines, sorted by key.
    #[must_use]
    pub fn summary(&self) -> Vec<String> {
        let counters = self.counters.values.read();
        let mut keys: Vec<_> = counters.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| format!("  {}: {}", key, counters[key]))
            .collect()
    }

    /// Print collected counters.
    pub fn print_summary(&self) {
        let lines = self.summary();
        if lines.is_empty() {
            eprintln!("No metrics collected.");
            return;
        }
        eprintln!();
        eprintln!("## Metrics Summary");
        eprintln!();
        for line in lines {
            eprintln!("{line}");
        }
    }
}
