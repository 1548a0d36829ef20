//! Shared HTTP client utilities

use crate::{GatewayError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds; bounds every RPC call end to end
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            // The dashboard fans out six requests at once
            pool_max_idle_per_host: 8,
            user_agent: format!("teleview/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    if config.timeout_secs == 0 {
        return Err(GatewayError::Config(
            "timeout_secs must be greater than zero".to_string(),
        ));
    }

    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        // Use rustls for TLS (no openssl dependency)
        .use_rustls_tls()
        .build()
        .map_err(|e| GatewayError::Config(format!("Failed to create HTTP client: {}", e)))
}
