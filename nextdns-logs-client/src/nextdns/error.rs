//! NextDNS error mapping

use crate::error::ClientError;
use crate::traits::{ApiErrorMapper, RawApiError};

use super::NextDnsClient;

/// Status-code driven mapping; the `errors[0].code` string is kept for `Unknown`.
impl ApiErrorMapper for NextDnsClient {
    fn map_error(&self, raw: RawApiError) -> ClientError {
        match raw.status {
            401 | 403 => ClientError::InvalidCredentials {
                raw_message: Some(raw.message),
            },
            404 => ClientError::ProfileNotFound {
                profile: self.profile_id.clone(),
                raw_message: Some(raw.message),
            },
            400 | 422 => ClientError::InvalidParameter {
                param: raw.param,
                detail: raw.message,
            },
            _ => self.unknown_error(raw),
        }
    }
}
