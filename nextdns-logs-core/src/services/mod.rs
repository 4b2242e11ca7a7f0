//! 业务逻辑服务层

pub mod export;
mod export_service;
mod normalizer;
mod pagination;

pub use export::{Exporter, StructuredExporter, TabularExporter, CSV_HEADER};
pub use export_service::{ExportReport, ExportService};
pub use normalizer::{normalize, RecordSkipped};
pub use pagination::PaginationEngine;
