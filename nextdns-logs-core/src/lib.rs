//! NextDNS query-log export core
//!
//! Turns the paginated query log of one NextDNS profile into a single
//! [`ExportBatch`](types::ExportBatch) and writes it as JSON and CSV:
//!
//! - record normalization ([`services::normalize`])
//! - pagination with cap, time floor and stall guard ([`services::PaginationEngine`])
//! - structured and tabular exporters ([`services::export`])
//! - the end-to-end run ([`services::ExportService`])
//!
//! The library reads no environment and parses no flags; callers build an
//! [`ExportConfig`](types::ExportConfig) and hand it in.

pub mod error;
pub mod services;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult, DownloadAborted};
pub use services::{ExportReport, ExportService, PaginationEngine};
pub use types::{ExportBatch, ExportConfig, ExportPlan, LogEntry, RunMetadata, StopReason};
