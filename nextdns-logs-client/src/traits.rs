use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::types::{Page, PageRequest};

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP 状态码
    pub status: u16,
    /// 错误码（来自 `errors[0].code`）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
    /// 出错的请求参数（来自 `errors[0].source.parameter`）
    pub param: Option<String>,
}

impl RawApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
            param: None,
        }
    }

    pub fn with_code(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: Some(code.into()),
            message: message.into(),
            param: None,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: Option<String>) -> Self {
        self.param = param;
        self
    }
}

/// 错误映射 Trait（内部使用）
/// 将非 2xx 响应映射到统一错误类型
pub(crate) trait ApiErrorMapper {
    /// 将原始 API 错误映射到统一错误类型
    fn map_error(&self, raw: RawApiError) -> ClientError;

    /// 快捷方法：解析错误
    fn parse_error(&self, detail: impl ToString) -> ClientError {
        ClientError::ParseError {
            detail: detail.to_string(),
        }
    }

    /// 快捷方法：未知错误（fallback）
    fn unknown_error(&self, raw: RawApiError) -> ClientError {
        ClientError::Unknown {
            status: raw.status,
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// A paginated source of raw query-log records.
///
/// Implemented by [`NextDnsClient`](crate::NextDnsClient); the pagination
/// engine only depends on this trait.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Source identifier, used in log lines.
    fn id(&self) -> &str;

    /// Fetch exactly one page.
    ///
    /// Transient failures are retried inside the implementation; any error
    /// returned here is terminal for the page.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page>;
}
