//! Teleview Gateway Transport
//!
//! HTTP implementation of the collector `RpcClient`.

pub mod client;
pub mod error;
pub mod rpc;

pub use client::{HttpClientConfig, create_client};
pub use error::{GatewayError, Result};
pub use rpc::{DEFAULT_GATEWAY_URL, DEFAULT_RPC_PATH, GatewayConfig, HttpRpcClient};
