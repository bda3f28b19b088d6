//! Caching decorator
//!
//! Stores the outcome of `execute` (result or error) under a fingerprint of
//! `(tool, input)` and replays it until the entry's TTL elapses.
//!
//! # Fingerprint
//!
//! SHA-256 over `{"input": <canonical input>, "tool": <name>}`, hex encoded.
//! When the input parses as JSON its object keys are sorted first, so
//! `{"a":1,"b":2}` and `{"b":2,"a":1}` share an entry. Anything else is
//! hashed as the raw string.
//!
//! Every outcome is stored, failures included, so a replay is identical to the
//! original call. The one exception is [`ProviderError::Cancelled`], which
//! reports the caller's token rather than the backend. Expired entries stay in
//! the map until overwritten or purged.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use gateway_domain::{CancellationToken, CapabilityProvider, ProviderError, Tool, ToolDescriptor};
use serde::Serialize;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, trace};

const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Deterministic cache key for one invocation
pub fn fingerprint(tool: &str, input: &str) -> String {
    let input = match serde_json::from_str::<Value>(input) {
        Ok(value) => canonicalize(value),
        Err(_) => Value::String(input.to_string()),
    };
    let payload = json!({ "input": input, "tool": tool });

    let mut hasher = Sha256::new();
    hasher.update(payload.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Rebuild objects with keys inserted in sorted order, recursively.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

struct CacheEntry {
    outcome: Result<String, ProviderError>,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) >= self.ttl
    }
}

/// Entry counts, computed without touching the entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

pub struct CachingDecorator {
    inner: Arc<dyn CapabilityProvider>,
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl CachingDecorator {
    pub fn new(inner: Arc<dyn CapabilityProvider>) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: Arc<dyn CapabilityProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let dropped = entries.len();
        entries.clear();
        debug!(provider = self.id(), dropped, "Cache cleared");
    }

    /// Remove expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before - entries.len();
        debug!(provider = self.id(), purged, "Purged expired cache entries");
        purged
    }

    pub async fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total: entries.len(),
            active: entries.len() - expired,
            expired,
        }
    }

    async fn lookup(&self, key: &str) -> Option<Result<String, ProviderError>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.outcome.clone())
    }
}

#[async_trait]
impl CapabilityProvider for CachingDecorator {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.inner.list_tools().await
    }

    async fn try_list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
        self.inner.try_list_tools().await
    }

    async fn list_tools_for(
        &self,
        required_names: &[String],
    ) -> Result<Vec<ToolDescriptor>, ProviderError> {
        self.inner.list_tools_for(required_names).await
    }

    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let key = fingerprint(name, input);

        if let Some(outcome) = self.lookup(&key).await {
            debug!(provider = self.id(), tool = name, "Cache hit");
            return outcome;
        }
        trace!(provider = self.id(), tool = name, key = %key, "Cache miss");

        let outcome = self.inner.execute(name, input, cancellation).await;

        if !matches!(&outcome, Err(e) if e.is_cancelled()) {
            let entry = CacheEntry {
                outcome: outcome.clone(),
                stored_at: Instant::now(),
                ttl: self.ttl,
            };
            self.entries.write().await.insert(key, entry);
        }

        outcome
    }

    async fn has(&self, name: &str) -> bool {
        self.inner.has(name).await
    }

    async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
        self.inner.register(tool).await
    }

    async fn validate_requirements(&self, required_names: &[String]) -> Result<(), ProviderError> {
        self.inner.validate_requirements(required_names).await
    }

    async fn list_names(&self) -> Vec<String> {
        self.inner.list_names().await
    }
}
