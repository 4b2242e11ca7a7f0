//! 导出服务
//!
//! Runs one export: validate the configuration, paginate, then write each
//! enabled format once. Files are written to `<file>.tmp` and renamed into
//! place so an interrupted run never leaves a half-written export behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nextdns_logs_client::{LogSource, NextDnsClient};

use crate::error::{CoreError, CoreResult, DownloadAborted};
use crate::services::export::{Exporter, StructuredExporter, TabularExporter};
use crate::services::PaginationEngine;
use crate::types::{ExportBatch, ExportConfig, ExportPlan, RunMetadata};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Number of entries exported. Zero means the window held no logs.
    pub entries: usize,
    /// Files written, in JSON-then-CSV order. Empty when `entries` is zero.
    pub files: Vec<PathBuf>,
    pub metadata: RunMetadata,
}

/// Query-log export service
pub struct ExportService {
    config: ExportConfig,
    source: Arc<dyn LogSource>,
}

impl ExportService {
    /// Build the service with a NextDNS client configured from `config`.
    pub fn new(config: ExportConfig) -> CoreResult<Self> {
        let mut client = NextDnsClient::new(config.credential.clone(), config.profile_id.clone())?
            .with_retry_policy(config.retry.clone());
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url.clone());
        }
        Ok(Self::with_source(config, Arc::new(client)))
    }

    /// Build the service on top of an arbitrary log source.
    #[must_use]
    pub fn with_source(config: ExportConfig, source: Arc<dyn LogSource>) -> Self {
        Self { config, source }
    }

    /// Run the export now.
    pub async fn run(&self) -> CoreResult<ExportReport> {
        self.run_at(Utc::now()).await
    }

    /// Run the export as if started at `now`.
    ///
    /// On a download failure the partial batch is still written (marked
    /// incomplete) and [`CoreError::DownloadFailed`] reports how many entries
    /// were saved.
    pub async fn run_at(&self, now: DateTime<Utc>) -> CoreResult<ExportReport> {
        self.config.validate(now)?;

        match self.download(now).await {
            Ok(batch) => {
                let files = self.write(&batch).await?;
                Ok(ExportReport {
                    entries: batch.len(),
                    files,
                    metadata: batch.metadata().clone(),
                })
            }
            Err(DownloadAborted { error, partial }) => {
                if partial.is_empty() {
                    return Err(CoreError::DownloadFailed {
                        source: error,
                        saved: 0,
                        files: Vec::new(),
                        write_error: None,
                    });
                }
                log::warn!(
                    "Download failed, saving {} entries collected so far",
                    partial.len()
                );
                let mut files = Vec::new();
                let write_error = self.write_into(&partial, &mut files).await.err();
                if let Some(write_err) = &write_error {
                    log::error!("Failed to save partial export: {write_err}");
                }
                Err(CoreError::DownloadFailed {
                    source: error,
                    saved: if files.is_empty() { 0 } else { partial.len() },
                    files,
                    write_error: write_error.map(Box::new),
                })
            }
        }
    }

    /// Paginate without writing anything.
    pub async fn download(&self, now: DateTime<Utc>) -> Result<ExportBatch, DownloadAborted> {
        let plan = ExportPlan::resolve(&self.config, now);
        PaginationEngine::new(self.source.clone(), plan).run().await
    }

    /// Write every enabled format for `batch`. An empty batch writes nothing.
    pub async fn write(&self, batch: &ExportBatch) -> CoreResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        self.write_into(batch, &mut written).await?;
        Ok(written)
    }

    /// Like [`write`](Self::write), pushing each file to `written` as soon as
    /// it is in place so a caller still knows what landed on error.
    async fn write_into(&self, batch: &ExportBatch, written: &mut Vec<PathBuf>) -> CoreResult<()> {
        if batch.is_empty() {
            log::info!("No logs to export");
            return Ok(());
        }

        let mut jobs: Vec<(PathBuf, &dyn Exporter)> = Vec::new();
        if self.config.emit_json {
            jobs.push((self.config.json_path(), &StructuredExporter));
        }
        if self.config.emit_csv {
            jobs.push((self.config.csv_path(), &TabularExporter));
        }

        for (path, exporter) in jobs {
            let bytes = exporter.render(batch)?;
            write_atomic(&path, &bytes).await?;
            log::info!(
                "Saved {} entries to {} ({})",
                batch.len(),
                path.display(),
                exporter.extension()
            );
            written.push(path);
        }
        Ok(())
    }
}

/// Write `bytes` next to `path` and rename over it.
async fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CoreError::io(parent, e))?;
    }
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| CoreError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(CoreError::io(path, e));
    }
    Ok(())
}
