//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::DateTime;
use nextdns_logs_client::{ClientError, Continuation, EndReason, LogSource, Page, PageRequest};
use serde_json::{json, Value};

use crate::types::{ExportBatch, ExportPlan, LogEntry};

// ===== MockLogSource =====

/// Scripted [`LogSource`]: answers each call with the next scripted result.
pub struct MockLogSource {
    script: Mutex<VecDeque<Result<Page, ClientError>>>,
    /// 如果 Some，脚本耗尽后一直返回此页
    repeat: Option<Page>,
    calls: AtomicUsize,
    requests: Mutex<Vec<PageRequest>>,
}

impl MockLogSource {
    pub fn new(script: Vec<Result<Page, ClientError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A source that returns the same page forever.
    pub fn repeating(page: Page) -> Self {
        Self {
            repeat: Some(page),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSource for MockLogSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn fetch_page(&self, request: &PageRequest) -> nextdns_logs_client::Result<Page> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        Ok(self
            .repeat
            .clone()
            .unwrap_or_else(|| Page::new(Vec::new(), Continuation::End(EndReason::EmptyPage))))
    }
}

// ===== 工厂方法 =====

/// Plan with the Unix epoch as floor and a page size of 100.
pub fn plan(max_records: Option<u64>) -> ExportPlan {
    ExportPlan {
        started_at: DateTime::from_timestamp(1_000_000, 0).unwrap(),
        time_floor: DateTime::UNIX_EPOCH,
        max_records,
        page_size: 100,
    }
}

/// Raw API record with a Unix-seconds timestamp.
pub fn record(ts: i64, domain: &str) -> Value {
    json!({
        "timestamp": DateTime::from_timestamp(ts, 0).unwrap().to_rfc3339(),
        "domain": domain,
        "status": "default",
    })
}

/// Page with one record per timestamp; `Next(cursor)` or the matching end.
pub fn page_of(timestamps: &[i64], cursor: Option<&str>) -> Page {
    let records: Vec<Value> = timestamps
        .iter()
        .map(|ts| record(*ts, &format!("host{ts}.example")))
        .collect();
    let continuation = match cursor {
        _ if records.is_empty() => Continuation::End(EndReason::EmptyPage),
        Some(c) => Continuation::Next(c.to_string()),
        None => Continuation::End(EndReason::NoCursor),
    };
    Page::new(records, continuation)
}

/// Bare entry at a Unix-seconds timestamp.
pub fn entry_at(ts: i64) -> LogEntry {
    LogEntry::new(DateTime::from_timestamp(ts, 0).unwrap())
}

/// Batch built by pushing `entries` in order.
pub fn batch_of(entries: Vec<LogEntry>) -> ExportBatch {
    let mut batch = ExportBatch::new(&plan(None));
    for entry in entries {
        batch.push(entry);
    }
    batch
}
