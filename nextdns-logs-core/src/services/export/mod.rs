//! Batch exporters
//!
//! Exporters render a finished [`ExportBatch`] into bytes. They never touch
//! the file system and never stamp the current time, so identical batches
//! always render to identical bytes.

mod structured;
mod tabular;

pub use self::structured::StructuredExporter;
pub use self::tabular::{TabularExporter, CSV_HEADER};

use crate::error::CoreResult;
use crate::types::ExportBatch;

/// Renders a batch into one output format.
pub trait Exporter: Send + Sync {
    /// File extension of the output, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, batch: &ExportBatch) -> CoreResult<Vec<u8>>;
}
