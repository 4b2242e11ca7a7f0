//! NextDNS LogSource 实现

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::LogSource;
use crate::types::{Continuation, Page, PageRequest};

use super::NextDnsClient;

#[async_trait]
impl LogSource for NextDnsClient {
    fn id(&self) -> &str {
        &self.profile_id
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        let request = request.validated();
        let envelope = self.get_logs(&request).await?;

        let next_cursor = envelope.next_cursor();
        let continuation =
            Continuation::from_response(&request, next_cursor, envelope.data.len());

        log::debug!(
            "[{}] page with {} records, continuation: {:?}",
            self.profile_id,
            envelope.data.len(),
            continuation
        );

        Ok(Page::new(envelope.data, continuation))
    }
}
