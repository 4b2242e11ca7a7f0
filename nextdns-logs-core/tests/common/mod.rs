//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mockito::{Matcher, Mock, Server};
use nextdns_logs_client::RetryPolicy;
use nextdns_logs_core::ExportConfig;
use serde_json::{json, Value};

pub const API_KEY: &str = "test-api-key";
pub const PROFILE: &str = "abc123";
pub const LOGS_PATH: &str = "/profiles/abc123/logs";
/// Smallest page the API accepts; keeps fixtures short.
pub const PAGE_SIZE: u32 = 10;

/// Query string of a first-page request (no cursor).
pub const FIRST_PAGE_QUERY: &str = "^limit=10&from=[^&]+$";

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Fixed "now" for every run.
pub fn now() -> DateTime<Utc> {
    at("2024-03-02T00:00:00Z")
}

/// 测试用重试策略：毫秒级退避，不等待 Retry-After
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        max_rate_limit_wait: Duration::from_millis(0),
        max_total_backoff: Duration::from_secs(1),
    }
}

pub fn config_for(server: &Server, dir: &Path) -> ExportConfig {
    let mut config = ExportConfig::new(API_KEY, PROFILE);
    config.output_prefix = dir.join("export");
    config.from_timestamp = Some(at("2024-01-01T00:00:00Z"));
    config.page_size = PAGE_SIZE;
    config.retry = fast_retry(3);
    config.base_url = Some(server.url());
    config
}

/// `count` records one second apart, newest first, starting at
/// `2024-03-01T12:00:<newest>Z`. Statuses rotate default/blocked/allowed.
pub fn records(newest: u32, count: u32) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let sec = newest - i;
            let status = ["default", "blocked", "allowed"][(sec % 3) as usize];
            json!({
                "timestamp": format!("2024-03-01T12:00:{sec:02}.000Z"),
                "domain": format!("host{sec}.example.com"),
                "root": "example.com",
                "status": status,
                "reasons": if status == "blocked" {
                    json!([{"id": "blocklist:oisd", "name": "OISD"}])
                } else {
                    json!([])
                },
                "device": {"id": "D1", "name": "Laptop, \"work\""},
                "protocol": "DNS-over-HTTPS",
                "type": "A",
                "encrypted": true,
            })
        })
        .collect()
}

pub fn envelope(records: &[Value], cursor: Option<&str>) -> String {
    json!({
        "data": records,
        "meta": { "pagination": { "cursor": cursor } }
    })
    .to_string()
}

fn cursor_query(cursor: &str) -> Matcher {
    Matcher::UrlEncoded("cursor".into(), cursor.into())
}

/// Three pages: 10 + 10 + 3 records (12:00:59 down to 12:00:37).
/// With `throttle`, the first request for page 2 is answered with 429.
pub async fn mount_three_pages(server: &mut Server, throttle: bool) -> Vec<Mock> {
    let mut mocks = Vec::new();
    mocks.push(
        server
            .mock("GET", LOGS_PATH)
            .match_header("x-api-key", API_KEY)
            .match_query(Matcher::Regex(FIRST_PAGE_QUERY.into()))
            .with_status(200)
            .with_body(envelope(&records(59, 10), Some("c1")))
            .expect(1)
            .create_async()
            .await,
    );
    if throttle {
        mocks.push(
            server
                .mock("GET", LOGS_PATH)
                .match_query(cursor_query("c1"))
                .with_status(429)
                .with_header("retry-after", "1")
                .with_body(r#"{"errors":[{"code":"tooManyRequests"}]}"#)
                .expect(1)
                .create_async()
                .await,
        );
    }
    mocks.push(
        server
            .mock("GET", LOGS_PATH)
            .match_query(cursor_query("c1"))
            .with_status(200)
            .with_body(envelope(&records(49, 10), Some("c2")))
            .expect(1)
            .create_async()
            .await,
    );
    mocks.push(
        server
            .mock("GET", LOGS_PATH)
            .match_query(cursor_query("c2"))
            .with_status(200)
            .with_body(envelope(&records(39, 3), Some("c3")))
            .expect(1)
            .create_async()
            .await,
    );
    mocks
}
