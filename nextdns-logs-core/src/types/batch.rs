//! Accumulated export batch and its run metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use nextdns_logs_client::EndReason;
use serde::Serialize;

use super::{ExportPlan, LogEntry};

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StopReason {
    /// The API signalled the end of the data.
    Exhausted { end: EndReason },
    /// The record cap was reached.
    Capped,
    /// The cursor did not advance on two consecutive pages.
    Stalled,
    /// A whole page was older than the time floor.
    PassedFloor,
    /// A terminal error aborted the run; the batch is partial.
    Failed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { end } => write!(f, "no more data ({end})"),
            Self::Capped => f.write_str("record cap reached"),
            Self::Stalled => f.write_str("cursor stalled"),
            Self::PassedFloor => f.write_str("passed the time floor"),
            Self::Failed => f.write_str("download failed"),
        }
    }
}

/// Counters and bounds describing one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    #[serde(with = "crate::utils::datetime")]
    pub started_at: DateTime<Utc>,
    /// Oldest instant requested.
    #[serde(with = "crate::utils::datetime")]
    pub time_floor: DateTime<Utc>,
    /// Record cap, `None` when unbounded.
    pub max_records: Option<u64>,
    /// Oldest exported entry.
    #[serde(with = "crate::utils::datetime::option")]
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Newest exported entry.
    #[serde(with = "crate::utils::datetime::option")]
    pub newest_entry: Option<DateTime<Utc>>,
    pub total_entries: u64,
    /// Entries per status; sorted so exports are deterministic.
    pub status_counts: BTreeMap<String, u64>,
    /// Raw records dropped because they had no usable timestamp.
    pub skipped_records: u64,
    /// Entries dropped because they were older than `time_floor`.
    pub out_of_window: u64,
    /// Identical entries found on both sides of a page boundary (kept).
    pub boundary_duplicates: u64,
    pub pages_fetched: u64,
    pub stop_reason: Option<StopReason>,
    /// `false` when the run was aborted and this batch is partial.
    pub complete: bool,
}

/// Every entry of a run, in page-delivery order, plus run metadata.
///
/// Only the pagination engine mutates a batch; exporters get `&ExportBatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBatch {
    metadata: RunMetadata,
    entries: Vec<LogEntry>,
}

impl ExportBatch {
    /// Empty batch for a resolved plan.
    pub fn new(plan: &ExportPlan) -> Self {
        Self {
            metadata: RunMetadata {
                started_at: plan.started_at,
                time_floor: plan.time_floor,
                max_records: plan.max_records,
                oldest_entry: None,
                newest_entry: None,
                total_entries: 0,
                status_counts: BTreeMap::new(),
                skipped_records: 0,
                out_of_window: 0,
                boundary_duplicates: 0,
                pages_fetched: 0,
                stop_reason: None,
                complete: false,
            },
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn metadata(&self) -> &RunMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Append one entry and update the derived counters.
    pub(crate) fn push(&mut self, entry: LogEntry) {
        let meta = &mut self.metadata;
        meta.total_entries += 1;
        *meta
            .status_counts
            .entry(entry.status.as_str().to_string())
            .or_insert(0) += 1;
        meta.oldest_entry = Some(
            meta.oldest_entry
                .map_or(entry.timestamp, |t| t.min(entry.timestamp)),
        );
        meta.newest_entry = Some(
            meta.newest_entry
                .map_or(entry.timestamp, |t| t.max(entry.timestamp)),
        );
        self.entries.push(entry);
    }

    pub(crate) fn metadata_mut(&mut self) -> &mut RunMetadata {
        &mut self.metadata
    }

    /// Seal the batch with the reason pagination stopped.
    pub(crate) fn finish(&mut self, reason: StopReason) {
        self.metadata.stop_reason = Some(reason);
        self.metadata.complete = reason != StopReason::Failed;
    }
}
