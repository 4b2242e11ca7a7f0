//! NextDNS API 类型定义

use serde::Deserialize;
use serde_json::Value;

/// `/logs` 响应
///
/// `data` 是必需字段；记录本身保持原始 JSON，由调用方逐条解析。
#[derive(Debug, Deserialize)]
pub struct LogsEnvelope {
    pub data: Vec<Value>,
    #[serde(default)]
    pub meta: Option<LogsMeta>,
}

impl LogsEnvelope {
    /// 下一页游标：优先 `meta.pagination.cursor`，兼容旧版 `meta.cursor`
    pub fn next_cursor(&self) -> Option<String> {
        let meta = self.meta.as_ref()?;
        meta.pagination
            .as_ref()
            .and_then(|p| p.cursor.clone())
            .or_else(|| meta.cursor.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsMeta {
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub cursor: Option<String>,
}

/// 错误响应 `{ "errors": [...] }`
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorItem>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorItem {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub source: Option<ApiErrorSource>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorSource {
    #[serde(default)]
    pub parameter: Option<String>,
}
