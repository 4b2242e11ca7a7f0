//! Canonical query-log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome class of a DNS query as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QueryStatus {
    /// Resolved normally, no list matched.
    Default,
    /// Explicitly allowed by an allowlist.
    Allowed,
    /// Blocked by a blocklist or security feature.
    Blocked,
    /// Resolution failed.
    Error,
    /// Any status this crate does not know yet, kept verbatim.
    Other(String),
}

impl QueryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Allowed => "allowed",
            Self::Blocked => "blocked",
            Self::Error => "error",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for QueryStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "default" | "" => Self::Default,
            "allowed" => Self::Allowed,
            "blocked" => Self::Blocked,
            "error" => Self::Error,
            _ => Self::Other(value),
        }
    }
}

impl From<QueryStatus> for String {
    fn from(value: QueryStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a query was blocked or allowed (list or feature id plus display name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One DNS query event.
///
/// `timestamp` is the only mandatory field. Serialization is sparse: absent
/// optionals and an empty reason list are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(with = "crate::utils::datetime")]
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    pub status: QueryStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<Reason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    /// Client software identifier reported by the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Query type (`A`, `AAAA`, `HTTPS`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnssec: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

impl LogEntry {
    /// A bare entry with only the mandatory fields set.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            domain: None,
            root: None,
            tracker: None,
            status: QueryStatus::Default,
            reasons: Vec::new(),
            device_id: None,
            device_name: None,
            device_model: None,
            client_ip: None,
            client: None,
            protocol: None,
            query_type: None,
            dnssec: None,
            encrypted: None,
        }
    }
}
