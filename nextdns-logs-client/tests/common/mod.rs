//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, Utc};
use nextdns_logs_client::{NextDnsClient, RetryPolicy};
use serde_json::{Value, json};

pub const API_KEY: &str = "test-api-key";
pub const PROFILE: &str = "abc123";
pub const LOGS_PATH: &str = "/profiles/abc123/logs";

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 测试用重试策略：毫秒级退避，避免拖慢测试
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        max_rate_limit_wait: Duration::from_millis(0),
        max_total_backoff: Duration::from_secs(1),
    }
}

/// 指向 mockito 服务器的客户端
pub fn client_for(server: &mockito::Server, max_retries: u32) -> NextDnsClient {
    let Ok(client) = NextDnsClient::new(API_KEY, PROFILE) else {
        unreachable!("building a reqwest client with static settings cannot fail");
    };
    client
        .with_base_url(server.url())
        .with_retry_policy(fast_retry(max_retries))
}

pub fn from() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// 一条 NextDNS 日志记录
pub fn record(timestamp: &str, domain: &str) -> Value {
    json!({
        "timestamp": timestamp,
        "domain": domain,
        "root": domain,
        "encrypted": true,
        "protocol": "DNS-over-HTTPS",
        "clientIp": "192.0.2.10",
        "status": "default",
        "reasons": []
    })
}

/// `/logs` 响应体
pub fn envelope(records: &[Value], cursor: Option<&str>) -> String {
    json!({
        "data": records,
        "meta": { "pagination": { "cursor": cursor } }
    })
    .to_string()
}
