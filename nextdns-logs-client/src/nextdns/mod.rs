//! NextDNS query log client

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::http_client::{RetryPolicy, create_http_client};
use crate::utils::log_sanitizer::mask_secret;

pub(crate) use types::{ApiErrorBody, LogsEnvelope};

pub(crate) const NEXTDNS_API_BASE: &str = "https://api.nextdns.io";

/// Client for `GET /profiles/{profile}/logs`.
pub struct NextDnsClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) profile_id: String,
    pub(crate) retry_policy: RetryPolicy,
}

impl NextDnsClient {
    pub fn new(api_key: impl Into<String>, profile_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            base_url: NEXTDNS_API_BASE.to_string(),
            api_key: api_key.into(),
            profile_id: profile_id.into(),
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Point the client at another API root (tests, proxies).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}

impl std::fmt::Debug for NextDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextDnsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("profile_id", &self.profile_id)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}
