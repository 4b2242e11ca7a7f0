//! Export configuration and the plan resolved from it.

use std::ffi::OsString;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use nextdns_logs_client::{mask_secret, RetryPolicy, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

use crate::error::{CoreError, CoreResult};

/// How far back the API keeps query logs.
pub const RETENTION_DAYS: i64 = 730;
/// Output prefix used when none is given.
pub const DEFAULT_OUTPUT_PREFIX: &str = "nextdns_logs";

/// Everything one export run needs, resolved by the caller.
///
/// No component reads the environment; the binary builds this object and
/// passes it in.
#[derive(Clone)]
pub struct ExportConfig {
    /// NextDNS API key.
    pub credential: String,
    pub profile_id: String,
    /// Output files are `<prefix>.json` and `<prefix>.csv`.
    pub output_prefix: PathBuf,
    /// Record cap, `None` for unbounded.
    pub max_records: Option<u64>,
    /// Oldest instant to export, `None` for the retention floor.
    pub from_timestamp: Option<DateTime<Utc>>,
    pub emit_json: bool,
    pub emit_csv: bool,
    /// Records requested per page.
    pub page_size: u32,
    pub retry: RetryPolicy,
    /// API root override, `None` for the public API.
    pub base_url: Option<String>,
}

impl ExportConfig {
    pub fn new(credential: impl Into<String>, profile_id: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            profile_id: profile_id.into(),
            output_prefix: PathBuf::from(DEFAULT_OUTPUT_PREFIX),
            max_records: None,
            from_timestamp: None,
            emit_json: true,
            emit_csv: true,
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
            base_url: None,
        }
    }

    /// Reject configurations that cannot produce a meaningful export.
    pub fn validate(&self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.credential.trim().is_empty() {
            return Err(CoreError::ValidationError("API key is required".to_string()));
        }
        if self.profile_id.trim().is_empty() {
            return Err(CoreError::ValidationError("profile id is required".to_string()));
        }
        if self.output_prefix.as_os_str().is_empty() {
            return Err(CoreError::ValidationError(
                "output prefix must not be empty".to_string(),
            ));
        }
        if !self.emit_json && !self.emit_csv {
            return Err(CoreError::ValidationError(
                "at least one output format must be enabled".to_string(),
            ));
        }
        if self.max_records == Some(0) {
            return Err(CoreError::ValidationError(
                "max records must be greater than zero".to_string(),
            ));
        }
        if let Some(from) = self.from_timestamp {
            if from > now {
                return Err(CoreError::ValidationError(format!(
                    "start timestamp {from} is in the future"
                )));
            }
        }
        Ok(())
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_path("json")
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_path("csv")
    }

    fn output_path(&self, extension: &str) -> PathBuf {
        let mut name: OsString = self.output_prefix.clone().into_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

impl std::fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportConfig")
            .field("credential", &mask_secret(&self.credential))
            .field("profile_id", &self.profile_id)
            .field("output_prefix", &self.output_prefix)
            .field("max_records", &self.max_records)
            .field("from_timestamp", &self.from_timestamp)
            .field("emit_json", &self.emit_json)
            .field("emit_csv", &self.emit_csv)
            .field("page_size", &self.page_size)
            .field("retry", &self.retry)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Bounds of one run, resolved from an [`ExportConfig`] at a fixed instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub started_at: DateTime<Utc>,
    /// Entries older than this are never exported.
    pub time_floor: DateTime<Utc>,
    pub max_records: Option<u64>,
    pub page_size: u32,
}

impl ExportPlan {
    /// Explicit start or the retention floor; explicit cap or unbounded.
    pub fn resolve(config: &ExportConfig, now: DateTime<Utc>) -> Self {
        let time_floor = config
            .from_timestamp
            .unwrap_or_else(|| retention_floor(now));
        Self {
            started_at: now,
            time_floor,
            max_records: config.max_records,
            page_size: config.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }
}

/// Oldest instant the API still has data for.
pub fn retention_floor(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(RETENTION_DAYS)
}
