use serde::{Deserialize, Serialize};

/// Unified error type for all log API operations.
///
/// Variants fall into four classes:
///
/// - **Transient**: [`NetworkError`](Self::NetworkError), [`Timeout`](Self::Timeout),
///   [`RateLimited`](Self::RateLimited) and [`ServerError`](Self::ServerError).
///   The built-in HTTP client retries these and only surfaces them wrapped in
///   [`RetriesExhausted`](Self::RetriesExhausted).
/// - **Terminal transport**: [`RetriesExhausted`](Self::RetriesExhausted).
/// - **Auth**: [`InvalidCredentials`](Self::InvalidCredentials) and
///   [`ProfileNotFound`](Self::ProfileNotFound); never retried.
/// - **Terminal API**: [`ParseError`](Self::ParseError),
///   [`InvalidParameter`](Self::InvalidParameter) and [`Unknown`](Self::Unknown).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ClientError {
    /// A network-level error occurred (DNS resolution failure, connection reset, etc.).
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429).
    RateLimited {
        /// Wait time in seconds requested by the server via `Retry-After`.
        retry_after: Option<u64>,
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The server answered with a 5xx status.
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Original response body.
        raw_message: String,
    },

    /// Every retry allowed by the policy failed with a transient error.
    RetriesExhausted {
        /// Total number of attempts made, including the first one.
        attempts: u32,
        /// The last transient error observed.
        last_error: Box<ClientError>,
    },

    /// The API key was rejected (HTTP 401/403).
    InvalidCredentials {
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The profile does not exist or is not visible to this API key (HTTP 404).
    ProfileNotFound {
        /// Profile identifier used in the request.
        profile: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter was rejected (HTTP 400/422).
    InvalidParameter {
        /// Name of the invalid parameter, when the API reports it.
        param: Option<String>,
        /// Description of what's wrong.
        detail: String,
    },

    /// The response envelope could not be parsed.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// An unrecognized error from the API.
    Unknown {
        /// HTTP status code.
        status: u16,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ClientError {
    /// Whether the transport should retry the request that produced this error.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::RateLimited { .. }
                | Self::ServerError { .. }
        )
    }

    /// Whether the error was caused by the credential or profile id.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. } | Self::ProfileNotFound { .. }
        )
    }

    /// Whether the transport gave up after retrying.
    #[must_use]
    pub fn is_transport_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { detail } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail } => write!(f, "Request timeout: {detail}"),
            Self::RateLimited { retry_after, .. } => {
                if let Some(secs) = retry_after {
                    write!(f, "Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "Rate limited")
                }
            }
            Self::ServerError { status, .. } => write!(f, "Server error (HTTP {status})"),
            Self::RetriesExhausted {
                attempts,
                last_error,
            } => write!(f, "Gave up after {attempts} attempts: {last_error}"),
            Self::InvalidCredentials { raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "Invalid API key: {msg}")
                } else {
                    write!(f, "Invalid API key")
                }
            }
            Self::ProfileNotFound {
                profile,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "Profile '{profile}' not found: {msg}")
                } else {
                    write!(f, "Profile '{profile}' not found")
                }
            }
            Self::InvalidParameter { param, detail } => match param {
                Some(param) => write!(f, "Invalid parameter '{param}': {detail}"),
                None => write!(f, "Invalid parameter: {detail}"),
            },
            Self::ParseError { detail } => write!(f, "Parse error: {detail}"),
            Self::Unknown {
                status,
                raw_message,
                ..
            } => write!(f, "HTTP {status}: {raw_message}"),
        }
    }
}

impl std::error::Error for ClientError {}

/// Convenience type alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
