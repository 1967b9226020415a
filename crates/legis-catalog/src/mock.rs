//! Scripted [`JsonSource`] for deterministic testing.
//!
//! Available to other crates with the `mock` feature.
//!
//! ## Usage
//!
//! ```rust
//! use legis_catalog::mock::MockSource;
//! use serde_json::json;
//!
//! let source = MockSource::new(|call| {
//!     Ok(match call.page() {
//!         Some(1) => json!({"dados": [{"id": 1, "nome": "Grupo"}]}),
//!         _ => json!({"dados": []}),
//!     })
//! });
//! assert!(source.calls().is_empty());
//! ```

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use legis_core::defaults::PAGE_PARAM;
use legis_core::{JsonSource, Result};

type Handler = dyn Fn(&MockCall) -> Result<JsonValue> + Send + Sync;

/// Mock source answering every request through a handler closure.
#[derive(Clone)]
pub struct MockSource {
    handler: Arc<Handler>,
    latency: Duration,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

/// One request received by a [`MockSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub base_url: String,
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl MockCall {
    /// Value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Requested page number, if this is a paginated request.
    pub fn page(&self) -> Option<u32> {
        self.param(PAGE_PARAM)?.parse().ok()
    }
}

impl MockSource {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&MockCall) -> Result<JsonValue> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            latency: Duration::ZERO,
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every request with the same body.
    pub fn fixed(body: JsonValue) -> Self {
        Self::new(move |_| Ok(body.clone()))
    }

    /// Delay every answer, for exercising overlapping loads.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency = Duration::from_millis(latency_ms);
        self
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        self.call_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    pub fn call_count(&self) -> usize {
        self.log().len()
    }
}

#[async_trait]
impl JsonSource for MockSource {
    async fn get_json(
        &self,
        base_url: &str,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<JsonValue> {
        let call = MockCall {
            base_url: base_url.to_string(),
            endpoint: endpoint.to_string(),
            params: params.to_vec(),
        };
        self.log().push(call.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.handler)(&call)
    }
}
