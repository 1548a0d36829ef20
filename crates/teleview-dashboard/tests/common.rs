//! Common test utilities for dashboard tests

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use teleview_core::{Error, Result, RpcClient};
use tokio::sync::Barrier;

/// One recorded `request` call
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub struct Call {
    pub method: String,
    pub params: Value,
}

/// Scriptable in-memory collector
///
/// Responses are keyed by method, or by `method:dimension` for `telemetry.top`.
/// Unscripted methods answer with an empty object.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeCollector {
    calls: Mutex<Vec<Call>>,
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashSet<String>>,
    panics: Mutex<HashSet<String>>,
    gate: Option<Barrier>,
}

#[allow(dead_code)]
impl FakeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every response until `parties` requests are in flight
    pub fn gated(parties: usize) -> Self {
        Self {
            gate: Some(Barrier::new(parties)),
            ..Self::default()
        }
    }

    pub fn respond(self, key: &str, response: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), response);
        self
    }

    pub fn fail(self, key: &str) -> Self {
        self.failures.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn panic_on(self, key: &str) -> Self {
        self.panics.lock().unwrap().insert(key.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    pub fn into_client(self) -> (Arc<Self>, Arc<dyn RpcClient>) {
        let fake = Arc::new(self);
        let client: Arc<dyn RpcClient> = fake.clone();
        (fake, client)
    }

    fn keys(method: &str, params: &Value) -> Vec<String> {
        let mut keys = Vec::new();
        if let Some(dimension) = params.get("dimension").and_then(Value::as_str) {
            keys.push(format!("{}:{}", method, dimension));
        }
        keys.push(method.to_string());
        keys
    }
}

#[async_trait]
impl RpcClient for FakeCollector {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let keys = Self::keys(method, &params);
        self.calls.lock().unwrap().push(Call {
            method: method.to_string(),
            params,
        });

        if let Some(gate) = &self.gate {
            gate.wait().await;
        }

        let panics = keys.iter().any(|key| self.panics.lock().unwrap().contains(key));
        if panics {
            panic!("collector exploded");
        }

        let fails = keys
            .iter()
            .any(|key| self.failures.lock().unwrap().contains(key));
        if fails {
            return Err(Error::Rpc {
                method: method.to_string(),
                message: "Telemetry indexer not available".to_string(),
            });
        }

        let responses = self.responses.lock().unwrap();
        let response = keys
            .iter()
            .find_map(|key| responses.get(key).cloned())
            .unwrap_or_else(|| json!({}));
        Ok(response)
    }
}

/// Timeline events one second apart
#[allow(dead_code)]
pub fn timeline_json(count: usize) -> Value {
    let events: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("evt-{}", i),
                "timestamp": format!("2025-01-01T00:00:{:02}.000Z", i),
                "kind": if i % 2 == 0 { "llm.call" } else { "tool.result" },
            })
        })
        .collect();
    json!({ "events": events })
}

/// A collector answering every overview method with one row each
#[allow(dead_code)]
pub fn overview_responses(fake: FakeCollector) -> FakeCollector {
    fake.respond(
        "telemetry.usage",
        json!({ "usage": { "totalSessions": 4, "totalRuns": 12, "totalTokens": 9000, "estimatedCost": 0.42, "errorCount": 1 } }),
    )
    .respond(
        "telemetry.sessions",
        json!({ "sessions": [{ "key": "agent:main:abc", "runCount": 3, "totalTokens": 1200 }] }),
    )
    .respond(
        "telemetry.costs",
        json!({ "costs": [{ "label": "claude-sonnet", "totalCost": 0.40 }] }),
    )
    .respond(
        "telemetry.top:models",
        json!({ "leaderboard": [{ "label": "claude-sonnet", "value": 0.40, "count": 10 }] }),
    )
    .respond(
        "telemetry.top:tools",
        json!({ "leaderboard": [{ "label": "bash", "value": 7.0, "count": 7 }] }),
    )
    .respond(
        "telemetry.errors",
        json!({ "errors": [{ "timestamp": "2025-01-01T00:00:00Z", "source": "tool", "message": "exit 1" }] }),
    )
}
