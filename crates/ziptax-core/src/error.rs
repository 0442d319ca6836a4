use std::fmt::{Display, Formatter};
use std::time::Duration;

use thiserror::Error;

/// Error discriminator exposed to callers that branch on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    RateLimited,
    Server,
    Connection,
    Timeout,
    Api,
    RetryExhausted,
    TaxCloudConfig,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Connection => "connection",
            Self::Timeout => "timeout",
            Self::Api => "api",
            Self::RetryExhausted => "retry_exhausted",
            Self::TaxCloudConfig => "taxcloud_config",
        }
    }

    /// Transient failure classes eligible for automatic re-attempt.
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Server | Self::RateLimited | Self::Connection | Self::Timeout
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every failure surfaced by the client.
///
/// Validation and TaxCloud configuration errors are raised before any I/O.
/// HTTP failures are classified once, at the transport boundary, and only
/// the retry engine produces [`ZipTaxError::RetryExhausted`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ZipTaxError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Authentication { message: String, status_code: u16 },

    #[error("{message}")]
    Authorization { message: String, status_code: u16 },

    #[error("{message}")]
    NotFound { message: String, status_code: u16 },

    #[error("{message}")]
    RateLimited {
        message: String,
        status_code: u16,
        /// Seconds advertised by the `Retry-After` header.
        retry_after: Option<u64>,
    },

    #[error("{message}")]
    Server { message: String, status_code: u16 },

    #[error("{message}")]
    Connection { message: String },

    #[error("{message}")]
    Timeout { message: String },

    #[error("{message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("{message}")]
    RetryExhausted {
        message: String,
        attempts: u32,
        #[source]
        last_error: Box<ZipTaxError>,
    },

    #[error("{message}")]
    TaxCloudConfig { message: String },
}

impl ZipTaxError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Unclassified failure that never reached a meaningful HTTP status.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn taxcloud_not_configured() -> Self {
        Self::TaxCloudConfig {
            message: String::from(
                "TaxCloud credentials not configured. Please provide \
                 taxcloud_connection_id and taxcloud_api_key when creating the client.",
            ),
        }
    }

    pub fn retry_exhausted(max_retries: u32, last_error: ZipTaxError) -> Self {
        Self::RetryExhausted {
            message: format!("Max retries ({max_retries}) exceeded: {last_error}"),
            attempts: max_retries.saturating_add(1),
            last_error: Box::new(last_error),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Server { .. } => ErrorKind::Server,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Api { .. } => ErrorKind::Api,
            Self::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Self::TaxCloudConfig { .. } => ErrorKind::TaxCloudConfig,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "ziptax.validation",
            ErrorKind::Authentication => "ziptax.authentication",
            ErrorKind::Authorization => "ziptax.authorization",
            ErrorKind::NotFound => "ziptax.not_found",
            ErrorKind::RateLimited => "ziptax.rate_limited",
            ErrorKind::Server => "ziptax.server",
            ErrorKind::Connection => "ziptax.connection",
            ErrorKind::Timeout => "ziptax.timeout",
            ErrorKind::Api => "ziptax.api",
            ErrorKind::RetryExhausted => "ziptax.retry_exhausted",
            ErrorKind::TaxCloudConfig => "ziptax.taxcloud_config",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Authentication { message, .. }
            | Self::Authorization { message, .. }
            | Self::NotFound { message, .. }
            | Self::RateLimited { message, .. }
            | Self::Server { message, .. }
            | Self::Connection { message }
            | Self::Timeout { message }
            | Self::Api { message, .. }
            | Self::RetryExhausted { message, .. }
            | Self::TaxCloudConfig { message } => message,
        }
    }

    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status_code, .. }
            | Self::Authorization { status_code, .. }
            | Self::NotFound { status_code, .. }
            | Self::RateLimited { status_code, .. }
            | Self::Server { status_code, .. } => Some(*status_code),
            Self::Api { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Server-advertised wait before the next attempt, for rate-limit errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after: Some(seconds),
                ..
            } => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }

    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    pub const fn attempts(&self) -> Option<u32> {
        match self {
            Self::RetryExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&ZipTaxError> {
        match self {
            Self::RetryExhausted { last_error, .. } => Some(last_error),
            _ => None,
        }
    }
}

pub type Result<T, E = ZipTaxError> = std::result::Result<T, E>;
