//! 类型定义模块

mod batch;
mod config;
mod log_entry;

pub use batch::{ExportBatch, RunMetadata, StopReason};
pub use config::{
    retention_floor, ExportConfig, ExportPlan, DEFAULT_OUTPUT_PREFIX, RETENTION_DAYS,
};
pub use log_entry::{LogEntry, QueryStatus, Reason};

// Re-export 客户端库的公共类型
pub use nextdns_logs_client::{Continuation, EndReason, Page, PageRequest, RetryPolicy};
