//! Tabular (CSV) exporter

use crate::error::{CoreError, CoreResult};
use crate::types::{ExportBatch, LogEntry};
use crate::utils::datetime;

use super::Exporter;

/// Fixed column order of the tabular export.
pub const CSV_HEADER: [&str; 15] = [
    "timestamp",
    "domain",
    "root",
    "tracker",
    "status",
    "reasons",
    "device_id",
    "device_name",
    "device_model",
    "client_ip",
    "client",
    "protocol",
    "query_type",
    "dnssec",
    "encrypted",
];

/// One row per entry under [`CSV_HEADER`]; absent fields are empty cells and
/// reason ids are joined with `;`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TabularExporter;

impl TabularExporter {
    fn row(entry: &LogEntry) -> [String; 15] {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let flag = |v: Option<bool>| v.map(|b| b.to_string()).unwrap_or_default();
        [
            datetime::format(&entry.timestamp),
            text(&entry.domain),
            text(&entry.root),
            text(&entry.tracker),
            entry.status.to_string(),
            entry
                .reasons
                .iter()
                .map(|r| r.id.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            text(&entry.device_id),
            text(&entry.device_name),
            text(&entry.device_model),
            text(&entry.client_ip),
            text(&entry.client),
            text(&entry.protocol),
            text(&entry.query_type),
            flag(entry.dnssec),
            flag(entry.encrypted),
        ]
    }
}

impl Exporter for TabularExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, batch: &ExportBatch) -> CoreResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for entry in batch.entries() {
            writer.write_record(Self::row(entry))?;
        }
        writer
            .into_inner()
            .map_err(|e| CoreError::SerializationError(e.to_string()))
    }
}
