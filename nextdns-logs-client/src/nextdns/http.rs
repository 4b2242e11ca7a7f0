//! NextDNS HTTP 请求方法

use chrono::SecondsFormat;

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ApiErrorMapper, RawApiError};
use crate::types::PageRequest;
use crate::utils::log_sanitizer::truncate_for_log;

use super::{ApiErrorBody, LogsEnvelope, NextDnsClient};

impl NextDnsClient {
    /// `/profiles/{profile}/logs` 的完整 URL
    pub(crate) fn logs_url(&self) -> String {
        format!(
            "{}/profiles/{}/logs",
            self.base_url,
            urlencoding::encode(&self.profile_id)
        )
    }

    /// 执行一次日志分页 GET 请求（带重试）
    pub(crate) async fn get_logs(&self, request: &PageRequest) -> Result<LogsEnvelope> {
        let url = self.logs_url();

        let mut query: Vec<(&str, String)> = vec![
            ("limit", request.limit.to_string()),
            (
                "from",
                request.from.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];
        if let Some(cursor) = &request.cursor {
            query.push(("cursor", cursor.clone()));
        }

        let builder = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&query);

        let (status, body) =
            HttpUtils::execute_request_with_retry(builder, "GET", &url, &self.retry_policy).await?;

        if !(200..300).contains(&status) {
            return Err(self.map_error(Self::raw_error(status, &body)));
        }

        serde_json::from_str::<LogsEnvelope>(&body).map_err(|e| {
            log::error!("Malformed logs envelope: {e}");
            log::error!("Raw response: {}", truncate_for_log(&body));
            self.parse_error(e)
        })
    }

    /// 从错误响应体中提取第一条错误
    fn raw_error(status: u16, body: &str) -> RawApiError {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        match parsed.errors.into_iter().next() {
            Some(item) => {
                let message = item.detail.unwrap_or_else(|| truncate_for_log(body));
                let param = item.source.and_then(|s| s.parameter);
                let raw = match item.code {
                    Some(code) => RawApiError::with_code(status, code, message),
                    None => RawApiError::new(status, message),
                };
                raw.with_param(param)
            }
            None => RawApiError::new(status, truncate_for_log(body)),
        }
    }
}
