//! Pipeline counters
//!
//! Counters only, monotonic, lock-free. A registry lives as long as the
//! caller wants to count; nothing is global.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of the shred and assembly pipeline
///
/// All counters use Relaxed atomics; values are exact once writers finish.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    records_shredded: AtomicU64,
    records_skipped: AtomicU64,
    entries_written: AtomicU64,
    records_assembled: AtomicU64,
    assembly_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_records_shredded(&self) {
        self.records_shredded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_skipped(&self) {
        self.records_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Add column entries written by the shredder
    pub fn add_entries_written(&self, entries: u64) {
        self.entries_written.fetch_add(entries, Ordering::Relaxed);
    }

    pub fn increment_records_assembled(&self) {
        self.records_assembled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_assembly_failures(&self) {
        self.assembly_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_shredded: self.records_shredded.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            entries_written: self.entries_written.load(Ordering::Relaxed),
            records_assembled: self.records_assembled.load(Ordering::Relaxed),
            assembly_failures: self.assembly_failures.load(Ordering::Relaxed),
        }
    }

    /// Current values rendered as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_shredded: u64,
    pub records_skipped: u64,
    pub entries_written: u64,
    pub records_assembled: u64,
    pub assembly_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.records_shredded, 0);
        assert_eq!(snapshot.entries_written, 0);
        assert_eq!(snapshot.assembly_failures, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_records_shredded();
        registry.increment_records_shredded();
        registry.increment_records_skipped();
        registry.add_entries_written(7);
        registry.add_entries_written(3);
        registry.increment_records_assembled();
        registry.increment_assembly_failures();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.records_shredded, 2);
        assert_eq!(snapshot.records_skipped, 1);
        assert_eq!(snapshot.entries_written, 10);
        assert_eq!(snapshot.records_assembled, 1);
        assert_eq!(snapshot.assembly_failures, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_entries_written(12);
        registry.increment_records_shredded();

        let json = registry.to_json();
        assert_eq!(json["entries_written"], 12);
        assert_eq!(json["records_shredded"], 1);
        assert_eq!(json["records_skipped"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_records_shredded();
                    reg.add_entries_written(2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.records_shredded, 800);
        assert_eq!(snapshot.entries_written, 1600);
    }
}
