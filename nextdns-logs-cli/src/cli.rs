//! Command-line arguments

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser};
use nextdns_logs_client::DEFAULT_PAGE_SIZE;
use nextdns_logs_core::types::DEFAULT_OUTPUT_PREFIX;
use nextdns_logs_core::utils::datetime;
use nextdns_logs_core::ExportConfig;

#[derive(Parser, Debug)]
#[command(name = "nextdns-logs")]
#[command(version)]
#[command(about = "Download NextDNS query logs to JSON and CSV")]
#[command(group(ArgGroup::new("format").args(["json_only", "csv_only"])))]
pub struct Args {
    /// NextDNS API key
    #[arg(long, env = "NEXTDNS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// NextDNS profile id
    #[arg(long, env = "NEXTDNS_PROFILE_ID")]
    pub profile: String,

    /// Output file prefix; writes <prefix>.json and <prefix>.csv
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PREFIX)]
    pub output: PathBuf,

    /// Stop after this many entries
    #[arg(long)]
    pub max_logs: Option<u64>,

    /// Oldest entry to export (RFC 3339 or Unix timestamp); defaults to the
    /// start of the retention window
    #[arg(long, value_parser = parse_from)]
    pub from: Option<DateTime<Utc>>,

    /// Only write the JSON file
    #[arg(long)]
    pub json_only: bool,

    /// Only write the CSV file
    #[arg(long)]
    pub csv_only: bool,

    /// Records requested per page (10-1000)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(10..=1000))]
    pub page_size: u32,
}

fn parse_from(value: &str) -> Result<DateTime<Utc>, String> {
    datetime::parse_str(value).ok_or_else(|| format!("invalid timestamp: {value}"))
}

impl Args {
    /// Resolve into a validated [`ExportConfig`].
    pub fn into_config(self, now: DateTime<Utc>) -> anyhow::Result<ExportConfig> {
        let mut config = ExportConfig::new(self.api_key, self.profile);
        config.output_prefix = self.output;
        config.max_records = self.max_logs;
        config.from_timestamp = self.from;
        config.emit_json = !self.csv_only;
        config.emit_csv = !self.json_only;
        config.page_size = self.page_size;
        config.validate(now).context("invalid arguments")?;
        Ok(config)
    }
}
