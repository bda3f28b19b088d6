//! Tool Aggregator
//!
//! The [`ToolAggregator`] merges several providers into a single namespace
//! and is itself a [`CapabilityProvider`], so callers cannot tell whether
//! they talk to one backend or many.
//!
//! # Usage
//!
//! ```ignore
//! use gateway_application::ToolAggregator;
//!
//! let aggregator = ToolAggregator::new("gateway");
//! aggregator.add_provider(builtin).await?;     // listed first, wins conflicts
//! aggregator.add_provider(filesystem).await?;
//!
//! // Routed to whichever provider owns "read_file"
//! let out = aggregator.execute("read_file", r#"{"path":"README.md"}"#, &cancel).await?;
//! ```
//!
//! # Conflict Resolution
//!
//! When two providers publish the same name, the provider listed first owns
//! it. Later duplicates are logged at WARN, recorded in
//! [`ToolAggregator::conflicts`], and invisible through the aggregate.
//!
//! Member ids are unique; [`ToolAggregator::add_provider`] refuses a second
//! member with an id already present.
//!
//! # Index Lifecycle
//!
//! 1. Any membership change or successful registration drops the index
//! 2. The next read enumerates every provider's catalog outside the index lock
//!    through [`CapabilityProvider::try_list_tools`]
//! 3. The rebuilt index is installed unless another invalidation happened
//!    in the meantime, tracked by a generation counter
//! 4. A provider whose catalog failed or came back empty contributes nothing
//!    to that read, and the index is served without being installed. The next
//!    read enumerates again, so a backend that starts late or recovers from a
//!    bad moment becomes routable without an explicit invalidation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use futures::future::join_all;
use gateway_domain::{
    CancellationToken, CapabilityProvider, ProviderError, Tool, ToolDescriptor,
    check_requirements, select_required,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

/// A name published by more than one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolConflict {
    pub tool: String,
    /// Provider that owns the name
    pub owner: String,
    /// Provider whose entry is hidden
    pub shadowed: String,
}

/// Statistics about the aggregate
#[derive(Debug, Clone, Serialize)]
pub struct AggregatorStats {
    pub total_providers: usize,
    pub total_tools: usize,
    pub tools_per_provider: HashMap<String, usize>,
    pub conflicts: usize,
}

/// Name to owner routing table plus the flattened catalog
struct AggregationIndex {
    owners: HashMap<String, Arc<dyn CapabilityProvider>>,
    tools: Vec<ToolDescriptor>,
    names: Vec<String>,
    conflicts: Vec<ToolConflict>,
}

impl AggregationIndex {
    fn build(
        providers: &[Arc<dyn CapabilityProvider>],
        catalogs: Vec<Vec<ToolDescriptor>>,
    ) -> Self {
        let mut owners: HashMap<String, Arc<dyn CapabilityProvider>> = HashMap::new();
        let mut tools = Vec::new();
        let mut names = Vec::new();
        let mut conflicts = Vec::new();

        for (provider, catalog) in providers.iter().zip(catalogs) {
            for tool in catalog {
                if let Some(owner) = owners.get(&tool.name) {
                    warn!(
                        tool = %tool.name,
                        owner = owner.id(),
                        shadowed = provider.id(),
                        "Tool name conflict, keeping first provider"
                    );
                    conflicts.push(ToolConflict {
                        tool: tool.name.clone(),
                        owner: owner.id().to_string(),
                        shadowed: provider.id().to_string(),
                    });
                    continue;
                }

                trace!(tool = %tool.name, provider = provider.id(), "Indexed tool");
                owners.insert(tool.name.clone(), provider.clone());
                names.push(tool.name.clone());
                tools.push(tool);
            }
        }

        Self {
            owners,
            tools,
            names,
            conflicts,
        }
    }
}

/// Aggregates multiple providers behind one [`CapabilityProvider`]
pub struct ToolAggregator {
    id: String,
    providers: RwLock<Vec<Arc<dyn CapabilityProvider>>>,
    index: RwLock<Option<Arc<AggregationIndex>>>,
    generation: AtomicU64,
}

impl ToolAggregator {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            providers: RwLock::new(Vec::new()),
            index: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Create an aggregate over `providers`, in priority order
    ///
    /// A provider whose id repeats an earlier one is dropped with a warning.
    pub fn with_providers(
        id: impl Into<String>,
        providers: Vec<Arc<dyn CapabilityProvider>>,
    ) -> Self {
        let aggregator = Self::new(id);
        let mut members: Vec<Arc<dyn CapabilityProvider>> = Vec::with_capacity(providers.len());
        for provider in providers {
            if members.iter().any(|m| m.id() == provider.id()) {
                warn!(
                    aggregator = %aggregator.id,
                    provider = provider.id(),
                    "Duplicate provider id, keeping first"
                );
                continue;
            }
            members.push(provider);
        }

        Self {
            providers: RwLock::new(members),
            ..aggregator
        }
    }

    /// Append a provider; it loses conflicts against every earlier one
    ///
    /// Fails with [`ProviderError::DuplicateProvider`] when a member already
    /// uses the same id.
    pub async fn add_provider(
        &self,
        provider: Arc<dyn CapabilityProvider>,
    ) -> Result<(), ProviderError> {
        {
            let mut providers = self.providers.write().await;
            if providers.iter().any(|p| p.id() == provider.id()) {
                return Err(ProviderError::DuplicateProvider(provider.id().to_string()));
            }
            debug!(aggregator = %self.id, provider = provider.id(), "Adding provider");
            providers.push(provider);
        }
        self.invalidate().await;
        Ok(())
    }

    /// Remove the provider with this id. Returns whether it was present.
    pub async fn remove_provider(&self, provider_id: &str) -> bool {
        let removed = {
            let mut providers = self.providers.write().await;
            let before = providers.len();
            providers.retain(|p| p.id() != provider_id);
            providers.len() != before
        };

        if removed {
            debug!(aggregator = %self.id, provider = provider_id, "Removed provider");
            self.invalidate().await;
        }
        removed
    }

    /// Drop the index; the next read rebuilds it
    pub async fn invalidate(&self) {
        let mut index = self.index.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *index = None;
    }

    /// Get a list of registered provider IDs
    pub async fn provider_ids(&self) -> Vec<String> {
        self.providers
            .read()
            .await
            .iter()
            .map(|p| p.id().to_string())
            .collect()
    }

    /// Names hidden by an earlier provider
    pub async fn conflicts(&self) -> Vec<ToolConflict> {
        self.index().await.conflicts.clone()
    }

    /// Get statistics about the aggregate
    pub async fn stats(&self) -> AggregatorStats {
        let total_providers = self.providers.read().await.len();
        let index = self.index().await;

        let mut tools_per_provider = HashMap::new();
        for owner in index.owners.values() {
            *tools_per_provider.entry(owner.id().to_string()).or_insert(0) += 1;
        }

        AggregatorStats {
            total_providers,
            total_tools: index.tools.len(),
            tools_per_provider,
            conflicts: index.conflicts.len(),
        }
    }

    async fn index(&self) -> Arc<AggregationIndex> {
        if let Some(index) = self.index.read().await.as_ref() {
            return index.clone();
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let providers = self.providers.read().await.clone();
        let results = join_all(providers.iter().map(|p| p.try_list_tools())).await;

        let mut complete = true;
        let mut catalogs = Vec::with_capacity(results.len());
        for (provider, result) in providers.iter().zip(results) {
            match result {
                Ok(tools) => {
                    if tools.is_empty() {
                        trace!(provider = provider.id(), "Provider listed no tools");
                        complete = false;
                    }
                    catalogs.push(tools);
                }
                Err(e) => {
                    warn!(
                        aggregator = %self.id,
                        provider = provider.id(),
                        error = %e,
                        "Catalog unavailable, provider excluded from this read"
                    );
                    complete = false;
                    catalogs.push(Vec::new());
                }
            }
        }
        let built = Arc::new(AggregationIndex::build(&providers, catalogs));

        if !complete {
            debug!(
                aggregator = %self.id,
                tools = built.tools.len(),
                "Serving partial tool index without caching it"
            );
            return built;
        }

        let mut slot = self.index.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            debug!(
                aggregator = %self.id,
                providers = providers.len(),
                tools = built.tools.len(),
                conflicts = built.conflicts.len(),
                "Rebuilt tool index"
            );
            *slot = Some(built.clone());
        } else {
            trace!(aggregator = %self.id, "Discarding index built before invalidation");
        }
        built
    }

    async fn owner_of(&self, name: &str) -> Option<Arc<dyn CapabilityProvider>> {
        self.index().await.owners.get(name).cloned()
    }
}

#[async_trait]
impl CapabilityProvider for ToolAggregator {
    fn id(&self) -> &str {
        &self.id
    }

    async fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.index().await.tools.clone()
    }

    async fn list_tools_for(
        &self,
        required_names: &[String],
    ) -> Result<Vec<ToolDescriptor>, ProviderError> {
        select_required(&self.index().await.tools, required_names)
    }

    async fn execute(
        &self,
        name: &str,
        input: &str,
        cancellation: &CancellationToken,
    ) -> Result<String, ProviderError> {
        let provider = self
            .owner_of(name)
            .await
            .ok_or_else(|| ProviderError::NotRoutable(name.to_string()))?;

        trace!(tool = name, provider = provider.id(), "Routing execution");
        provider.execute(name, input, cancellation).await
    }

    async fn has(&self, name: &str) -> bool {
        self.index().await.owners.contains_key(name)
    }

    async fn register(&self, tool: Tool) -> Result<(), ProviderError> {
        let providers = self.providers.read().await.clone();
        let mut last_error = None;

        for provider in &providers {
            match provider.register(tool.clone()).await {
                Ok(()) => {
                    info!(tool = tool.name(), provider = provider.id(), "Registered tool");
                    self.invalidate().await;
                    return Ok(());
                }
                Err(e) => {
                    debug!(
                        tool = tool.name(),
                        provider = provider.id(),
                        error = %e,
                        "Provider declined registration"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::RegistrationRejected {
            provider: self.id.clone(),
            reason: "no providers configured".to_string(),
        }))
    }

    async fn validate_requirements(&self, required_names: &[String]) -> Result<(), ProviderError> {
        let index = self.index().await;
        check_requirements(index.names.iter().map(String::as_str), required_names)
    }

    async fn list_names(&self) -> Vec<String> {
        self.index().await.names.clone()
    }
}
