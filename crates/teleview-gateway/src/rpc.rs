//! JSON request/response frames over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use teleview_core::RpcClient;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    GatewayError, Result,
    client::{HttpClientConfig, create_client},
};

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:18789";
pub const DEFAULT_RPC_PATH: &str = "/rpc";

/// Where and how to reach the gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub rpc_path: String,
    /// Sent as `Authorization: Bearer <token>` when set
    pub token: Option<String>,
    pub client_config: HttpClientConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            token: None,
            client_config: HttpClientConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn endpoint(&self) -> String {
        let base = self.url.trim_end_matches('/');
        if self.rpc_path.is_empty() {
            base.to_string()
        } else if self.rpc_path.starts_with('/') {
            format!("{}{}", base, self.rpc_path)
        } else {
            format!("{}/{}", base, self.rpc_path)
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestFrame<'a> {
    #[serde(rename = "type")]
    frame_type: &'static str,
    id: &'a str,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ResponseFrame {
    #[serde(rename = "type", default)]
    frame_type: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    error: Option<ErrorShape>,
}

#[derive(Debug, Deserialize)]
struct ErrorShape {
    #[serde(default)]
    message: String,
}

/// [`RpcClient`] speaking the gateway's `req`/`res` frames over HTTP POST
pub struct HttpRpcClient {
    client: Client,
    endpoint: String,
    token: Option<String>,
    timeout_secs: u64,
}

impl HttpRpcClient {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(GatewayError::Config("gateway url is empty".to_string()));
        }
        let client = create_client(&config.client_config)?;
        Ok(Self {
            endpoint: config.endpoint(),
            token: config.token.filter(|token| !token.is_empty()),
            timeout_secs: config.client_config.timeout_secs,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_frame(&self, method: &str, params: &Value) -> Result<ResponseFrame> {
        let id = Uuid::new_v4().to_string();
        let frame = RequestFrame {
            frame_type: "req",
            id: &id,
            method,
            params,
        };

        let mut request = self.client.post(&self.endpoint).json(&frame);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        debug!("→ {} ({})", method, id);
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(GatewayError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        let frame: ResponseFrame = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.timeout_secs)
            } else {
                GatewayError::Protocol(format!("{} response: {}", method, e))
            }
        })?;

        if !frame.frame_type.is_empty() && frame.frame_type != "res" {
            return Err(GatewayError::Protocol(format!(
                "expected a res frame, got {:?}",
                frame.frame_type
            )));
        }
        if !frame.id.is_empty() && frame.id != id {
            warn!("Response id {} does not match request id {}", frame.id, id);
            return Err(GatewayError::Protocol(format!(
                "response id {} does not match request {}",
                frame.id, id
            )));
        }

        debug!("← {} ({}) ok={}", method, id, frame.ok);
        Ok(frame)
    }

    fn map_send_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout_secs)
        } else {
            GatewayError::Http(err)
        }
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn request(&self, method: &str, params: Value) -> teleview_core::Result<Value> {
        let frame = self.send_frame(method, &params).await?;

        if !frame.ok {
            let message = frame
                .error
                .map(|error| error.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "request failed".to_string());
            return Err(teleview_core::Error::Rpc {
                method: method.to_string(),
                message,
            });
        }

        Ok(frame.payload.unwrap_or(Value::Null))
    }
}
