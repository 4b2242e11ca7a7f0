//! Structured (JSON) exporter

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::types::{ExportBatch, LogEntry, RunMetadata};

use super::Exporter;

/// Output document: run metadata followed by every entry.
#[derive(Serialize)]
struct Document<'a> {
    metadata: &'a RunMetadata,
    logs: &'a [LogEntry],
}

/// Pretty-printed `{ "metadata": {...}, "logs": [...] }`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredExporter;

impl Exporter for StructuredExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, batch: &ExportBatch) -> CoreResult<Vec<u8>> {
        let doc = Document {
            metadata: batch.metadata(),
            logs: batch.entries(),
        };
        let mut out = serde_json::to_vec_pretty(&doc)
            .map_err(|e| CoreError::SerializationError(e.to_string()))?;
        out.push(b'\n');
        Ok(out)
    }
}
