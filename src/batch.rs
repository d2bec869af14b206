//! Batch shredding with an error policy
//!
//! A batch either stops at the first rejected record (`Abort`) or drops
//! rejected records and carries on (`Skip`). Rejected records never leave
//! entries behind, so the columns stay record-aligned under both policies.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::StripedColumns;
use crate::observability::{Event, Logger, MetricsRegistry, ObservationScope};
use crate::shred::{ShredResult, Shredder};

/// What a batch does when a record is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop and return the error
    #[default]
    Abort,
    /// Drop the record, log it, and continue
    Skip,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Abort => "abort",
            ErrorPolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShredReport {
    pub records_seen: usize,
    pub records_shredded: usize,
    pub records_skipped: usize,
    pub entries_written: usize,
    /// Batch positions of skipped records
    pub skipped: Vec<usize>,
}

/// Shreds a sequence of records into one column set.
pub struct BatchShredder<'a> {
    shredder: Shredder<'a>,
    policy: ErrorPolicy,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> BatchShredder<'a> {
    pub fn new(shredder: Shredder<'a>, policy: ErrorPolicy) -> Self {
        Self {
            shredder,
            policy,
            metrics: None,
        }
    }

    /// Counts shredded and skipped records in `metrics`
    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Shreds every record into fresh columns.
    pub fn shred<'r, I>(&self, records: I) -> ShredResult<(StripedColumns, ShredReport)>
    where
        I: IntoIterator<Item = &'r Value>,
    {
        let mut columns = StripedColumns::new(self.shredder.schema());
        let report = self.shred_into(records, &mut columns)?;
        Ok((columns, report))
    }

    /// Appends every record to `columns`.
    ///
    /// Errors that no record can recover from (foreign columns) stop the
    /// batch under either policy.
    ///
    /// Under `Abort` the returned error carries the record's batch position;
    /// records before it remain in `columns`.
    pub fn shred_into<'r, I>(
        &self,
        records: I,
        columns: &mut StripedColumns,
    ) -> ShredResult<ShredReport>
    where
        I: IntoIterator<Item = &'r Value>,
    {
        let scope = ObservationScope::with_fields("SHRED_BATCH", &[("policy", self.policy.as_str())]);
        let mut report = ShredReport::default();

        for (index, record) in records.into_iter().enumerate() {
            report.records_seen += 1;
            let before = columns.total_entries();

            match self.shredder.shred(record, columns) {
                Ok(()) => {
                    let written = columns.total_entries() - before;
                    report.records_shredded += 1;
                    report.entries_written += written;
                    if let Some(metrics) = self.metrics {
                        metrics.increment_records_shredded();
                        metrics.add_entries_written(written as u64);
                    }
                }
                Err(err) => {
                    let err = err.at_record(index);
                    if self.policy == ErrorPolicy::Abort || err.is_fatal() {
                        scope.fail(err.code().code(), err.message());
                        return Err(err);
                    }

                    let position = index.to_string();
                    Logger::warn(
                        Event::RecordSkipped.as_str(),
                        &[
                            ("code", err.code().code()),
                            ("path", err.path()),
                            ("record", position.as_str()),
                        ],
                    );
                    report.records_skipped += 1;
                    report.skipped.push(index);
                    if let Some(metrics) = self.metrics {
                        metrics.increment_records_skipped();
                    }
                }
            }
        }

        let shredded = report.records_shredded.to_string();
        let skipped = report.records_skipped.to_string();
        let entries = report.entries_written.to_string();
        scope.complete_with_fields(&[
            ("entries", entries.as_str()),
            ("records", shredded.as_str()),
            ("skipped", skipped.as_str()),
        ]);
        Ok(report)
    }
}
