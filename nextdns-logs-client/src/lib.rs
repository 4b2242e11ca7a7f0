//! # nextdns-logs-client
//!
//! Rate-limited, paginated client for the NextDNS query log API
//! (`GET /profiles/{profile}/logs`).
//!
//! The crate has two layers:
//!
//! - a **transport** ([`RetryPolicy`]) that resends a request while it fails
//!   with a transient error (429, 5xx, timeout, connection failure), honouring
//!   `Retry-After` and a bounded exponential backoff;
//! - a **page fetcher** ([`NextDnsClient`], behind the [`LogSource`] trait) that
//!   issues one bounded request per page and decides whether pagination
//!   continues ([`Continuation`]).
//!
//! Records are returned as raw JSON; typing them is left to the caller.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chrono::{Duration, Utc};
//! use nextdns_logs_client::{LogSource, NextDnsClient, PageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NextDnsClient::new("your-api-key", "abc123")?;
//!
//!     let mut request = PageRequest::first(Utc::now() - Duration::days(1), 100);
//!     loop {
//!         let page = client.fetch_page(&request).await?;
//!         println!("{} records", page.records.len());
//!         match page.continuation.cursor() {
//!             Some(cursor) => request.cursor = Some(cursor.to_string()),
//!             None => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, ClientError>`](ClientError). Transient
//! failures never escape on their own: once the retry budget is spent they are
//! wrapped in [`ClientError::RetriesExhausted`], which keeps "the network gave
//! up" apart from "the API said no" ([`ClientError::InvalidCredentials`],
//! [`ClientError::ProfileNotFound`], [`ClientError::ParseError`], ...).

mod error;
mod http_client;
mod nextdns;
mod traits;
mod types;
mod utils;

pub use error::{ClientError, Result};

pub use http_client::RetryPolicy;

pub use nextdns::NextDnsClient;

pub use traits::LogSource;

pub use types::{
    Continuation, DEFAULT_PAGE_SIZE, EndReason, MAX_PAGE_SIZE, MIN_PAGE_SIZE, Page, PageRequest,
};

pub use utils::log_sanitizer::mask_secret;
