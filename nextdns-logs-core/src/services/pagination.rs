//! Pagination engine
//!
//! Drives [`LogSource::fetch_page`] until the source runs dry, the record cap
//! is reached, every entry of a page is older than the time floor, or the
//! stall guard trips. Pages are awaited strictly one after another.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nextdns_logs_client::{ClientError, Continuation, LogSource, Page, PageRequest};

use crate::error::DownloadAborted;
use crate::services::normalizer::normalize;
use crate::types::{ExportBatch, ExportPlan, LogEntry, StopReason};

/// Consecutive pages without progress that stop the run.
const STALL_THRESHOLD: u32 = 2;

/// Engine states. `Done` and `Failed` are terminal.
#[derive(Debug)]
enum EngineState {
    Initializing,
    Fetching(PageRequest),
    Accumulating { request: PageRequest, page: Page },
    Done(StopReason),
    Failed(ClientError),
}

/// Detects a source that keeps answering without moving backwards in time.
#[derive(Debug, Default)]
struct StallGuard {
    requested_cursors: HashSet<String>,
    last_position: Option<DateTime<Utc>>,
    idle_pages: u32,
}

impl StallGuard {
    /// Record the oldest entry of a page that produced entries. Returns `true`
    /// once the position has failed to advance on `STALL_THRESHOLD`
    /// consecutive such pages.
    fn observe_position(&mut self, oldest: DateTime<Utc>) -> bool {
        let advanced = self.last_position.is_none_or(|last| oldest < last);
        if advanced {
            self.last_position = Some(oldest);
            self.idle_pages = 0;
        } else {
            self.idle_pages += 1;
        }
        self.idle_pages >= STALL_THRESHOLD
    }

    /// Remember a cursor about to be requested. Returns `false` if it was
    /// requested before in this run.
    fn claim_cursor(&mut self, cursor: &str) -> bool {
        self.requested_cursors.insert(cursor.to_string())
    }
}

/// Collects one [`ExportBatch`] from a [`LogSource`].
pub struct PaginationEngine {
    source: Arc<dyn LogSource>,
    plan: ExportPlan,
}

impl PaginationEngine {
    #[must_use]
    pub fn new(source: Arc<dyn LogSource>, plan: ExportPlan) -> Self {
        Self { source, plan }
    }

    /// Run to completion.
    ///
    /// On a terminal client error the entries accumulated so far are returned
    /// inside [`DownloadAborted`].
    pub async fn run(&self) -> Result<ExportBatch, DownloadAborted> {
        let mut batch = ExportBatch::new(&self.plan);
        let mut guard = StallGuard::default();
        let mut state = EngineState::Initializing;

        log::info!(
            "[{}] downloading logs since {} (cap: {})",
            self.source.id(),
            self.plan.time_floor,
            self.plan
                .max_records
                .map_or_else(|| "none".to_string(), |c| c.to_string())
        );

        loop {
            state = match state {
                EngineState::Initializing => match self.next_limit(&batch) {
                    Some(limit) => {
                        EngineState::Fetching(PageRequest::first(self.plan.time_floor, limit))
                    }
                    None => EngineState::Done(StopReason::Capped),
                },
                EngineState::Fetching(request) => {
                    match self.source.fetch_page(&request).await {
                        Ok(page) => {
                            batch.metadata_mut().pages_fetched += 1;
                            EngineState::Accumulating { request, page }
                        }
                        Err(e) => EngineState::Failed(e),
                    }
                }
                EngineState::Accumulating { request, page } => {
                    self.accumulate(&mut batch, &mut guard, &request, page)
                }
                EngineState::Done(reason) => {
                    batch.finish(reason);
                    log::info!(
                        "[{}] finished: {} entries from {} pages ({reason})",
                        self.source.id(),
                        batch.len(),
                        batch.metadata().pages_fetched
                    );
                    return Ok(batch);
                }
                EngineState::Failed(error) => {
                    batch.finish(StopReason::Failed);
                    log::warn!(
                        "[{}] aborted after {} entries: {error}",
                        self.source.id(),
                        batch.len()
                    );
                    return Err(DownloadAborted {
                        error,
                        partial: batch,
                    });
                }
            };
        }
    }

    /// Limit for the next request, `None` once the cap is reached.
    fn next_limit(&self, batch: &ExportBatch) -> Option<u32> {
        let Some(cap) = self.plan.max_records else {
            return Some(self.plan.page_size);
        };
        let remaining = cap.saturating_sub(batch.len() as u64);
        if remaining == 0 {
            return None;
        }
        Some(u32::try_from(remaining).map_or(self.plan.page_size, |r| r.min(self.plan.page_size)))
    }

    fn accumulate(
        &self,
        batch: &mut ExportBatch,
        guard: &mut StallGuard,
        request: &PageRequest,
        page: Page,
    ) -> EngineState {
        let page_no = batch.metadata().pages_fetched;
        let record_count = page.records.len();

        // 1. 逐条规范化，失败的记录计数后跳过
        let mut entries: Vec<LogEntry> = Vec::with_capacity(record_count);
        for raw in &page.records {
            match normalize(raw) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    batch.metadata_mut().skipped_records += 1;
                    log::debug!("[{}] skipped record: {reason}", self.source.id());
                }
            }
        }

        // 2. 游标位置必须持续后移（全部记录都被跳过的页不参与判断）
        if let Some(oldest) = entries.iter().map(|e| e.timestamp).min() {
            if guard.observe_position(oldest) {
                log::warn!(
                    "[{}] page {page_no} did not advance past {:?}, discarding it",
                    self.source.id(),
                    guard.last_position
                );
                return EngineState::Done(StopReason::Stalled);
            }
        }

        // 3. 早于时间下限的条目丢弃
        let normalized = entries.len();
        entries.retain(|e| e.timestamp >= self.plan.time_floor);
        let below_floor = normalized - entries.len();
        batch.metadata_mut().out_of_window += below_floor as u64;
        let passed_floor = normalized > 0 && entries.is_empty();

        // 4. 截断到剩余配额
        if let Some(limit) = self.next_limit(batch) {
            entries.truncate(limit as usize);
        } else {
            entries.clear();
        }

        // 5. 跨页边界的完全重复条目只计数，不去重
        if let (Some(last), Some(first)) = (batch.last(), entries.first()) {
            if last == first {
                batch.metadata_mut().boundary_duplicates += 1;
                log::warn!(
                    "[{}] page {page_no} starts with an exact duplicate of the previous entry ({})",
                    self.source.id(),
                    first.timestamp
                );
            }
        }

        let kept = entries.len();
        for entry in entries {
            batch.push(entry);
        }
        log::info!(
            "[{}] page {page_no}: {kept} of {record_count} records kept, {} total",
            self.source.id(),
            batch.len()
        );

        // 6. 决定下一步
        let Some(limit) = self.next_limit(batch) else {
            return EngineState::Done(StopReason::Capped);
        };
        if passed_floor {
            return EngineState::Done(StopReason::PassedFloor);
        }
        match page.continuation {
            Continuation::End(end) => EngineState::Done(StopReason::Exhausted { end }),
            Continuation::Next(cursor) => {
                if !guard.claim_cursor(&cursor) {
                    log::warn!(
                        "[{}] cursor {cursor} was already requested, stopping",
                        self.source.id()
                    );
                    return EngineState::Done(StopReason::Stalled);
                }
                EngineState::Fetching(PageRequest {
                    cursor: Some(cursor),
                    from: request.from,
                    limit,
                })
            }
        }
    }
}
