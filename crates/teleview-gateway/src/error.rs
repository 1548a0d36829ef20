//! Transport error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway returned status {status_code}: {message}")]
    Status { status_code: u16, message: String },

    #[error("Request timeout after {0}s")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed response frame: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

impl From<GatewayError> for teleview_core::Error {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout(secs) => teleview_core::Error::Timeout(secs),
            GatewayError::Config(msg) => teleview_core::Error::Config(msg),
            GatewayError::Protocol(msg) => teleview_core::Error::InvalidRequest(msg),
            other => teleview_core::Error::Transport(other.to_string()),
        }
    }
}
