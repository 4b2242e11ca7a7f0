use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Page Request ============

/// Smallest `limit` the logs endpoint accepts.
pub const MIN_PAGE_SIZE: u32 = 10;
/// Largest `limit` the logs endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;
/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Parameters for one page of the query log.
///
/// Every request of a run carries the same `from`; `cursor` is `None` only for
/// the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Continuation token returned by the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// Oldest instant to return entries for.
    pub from: DateTime<Utc>,
    /// Number of records requested.
    pub limit: u32,
}

impl PageRequest {
    /// Request for the first page of a run.
    pub fn first(from: DateTime<Utc>, limit: u32) -> Self {
        Self {
            cursor: None,
            from,
            limit,
        }
    }

    /// Clamp `limit` to the range the API accepts.
    #[must_use]
    pub fn validated(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
            from: self.from,
            limit: self.limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }
}

// ============ Page ============

/// Why a page is the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// The page carried no records.
    EmptyPage,
    /// The API returned no continuation token.
    NoCursor,
    /// The continuation token equals the one that requested this page.
    RepeatedCursor,
    /// Fewer records than requested were returned.
    ShortPage,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::EmptyPage => "empty page",
            Self::NoCursor => "no continuation cursor",
            Self::RepeatedCursor => "repeated cursor",
            Self::ShortPage => "short page",
        };
        f.write_str(text)
    }
}

/// Where pagination continues after a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Continuation {
    /// Fetch the next page with this cursor.
    Next(String),
    /// No more data.
    End(EndReason),
}

impl Continuation {
    /// Decide how pagination continues after a page.
    ///
    /// `requested` is the request that produced the page, `next_cursor` the
    /// token found in the response and `record_count` the number of records.
    pub fn from_response(
        requested: &PageRequest,
        next_cursor: Option<String>,
        record_count: usize,
    ) -> Self {
        if record_count == 0 {
            return Self::End(EndReason::EmptyPage);
        }
        let Some(cursor) = next_cursor.filter(|c| !c.is_empty()) else {
            return Self::End(EndReason::NoCursor);
        };
        if requested.cursor.as_deref() == Some(cursor.as_str()) {
            return Self::End(EndReason::RepeatedCursor);
        }
        if record_count < requested.limit as usize {
            return Self::End(EndReason::ShortPage);
        }
        Self::Next(cursor)
    }

    /// The cursor for the next page, if any.
    pub fn cursor(&self) -> Option<&str> {
        match self {
            Self::Next(cursor) => Some(cursor),
            Self::End(_) => None,
        }
    }
}

/// One page of raw log records.
///
/// Records are kept as raw JSON so a single malformed record never fails the
/// whole page; turning them into typed entries is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Raw records in API delivery order.
    pub records: Vec<serde_json::Value>,
    /// Where to continue.
    pub continuation: Continuation,
}

impl Page {
    pub fn new(records: Vec<serde_json::Value>, continuation: Continuation) -> Self {
        Self {
            records,
            continuation,
        }
    }
}
