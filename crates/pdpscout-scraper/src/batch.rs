//! Batch scheduling: every (identifier, store) pair as one bounded,
//! time-limited lookup.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use pdpscout_core::{normalize_identifier, AppConfig, StoreTarget};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::ScraperError;
use crate::resolver::{PlatformCache, ResolveContext, ResolverTable};
use crate::strategy::StrategyRegistry;
use crate::table::{Resolution, ResultRow, ResultTable};
use crate::transport::{HttpTransport, Transport, TransportConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("no stores selected for batch")]
    NoStores,

    #[error("duplicate store slug '{0}' in batch")]
    DuplicateSlug(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Simultaneous lookups across the whole batch.
    pub max_concurrent_lookups: usize,
    /// Ceiling for one lookup, measured from when it gets a permit.
    pub store_timeout: Duration,
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent_lookups: config.max_concurrent_lookups,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: 6,
            store_timeout: Duration::from_secs(9),
        }
    }
}

/// Identifiers whose row is complete, out of the batch total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
}

/// Resolves batches of identifiers against sets of stores.
#[derive(Clone)]
pub struct ResolutionEngine {
    transport: Arc<dyn Transport>,
    registry: Arc<StrategyRegistry>,
    resolvers: Arc<ResolverTable>,
    config: EngineConfig,
}

impl ResolutionEngine {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<StrategyRegistry>,
        resolvers: Arc<ResolverTable>,
        config: EngineConfig,
    ) -> Self {
        Self {
            transport,
            registry,
            resolvers,
            config,
        }
    }

    /// Engine over a real HTTP transport, with dedicated resolvers for the
    /// given stores.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the HTTP client cannot be built.
    pub fn from_app_config(
        config: &AppConfig,
        stores: &[StoreTarget],
    ) -> Result<Self, ScraperError> {
        let transport = HttpTransport::new(&TransportConfig::from_app_config(config))?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(StrategyRegistry::new()),
            Arc::new(ResolverTable::from_stores(stores)),
            EngineConfig::from_app_config(config),
        ))
    }

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Resolve every identifier against every store.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] when the store set is empty or repeats a slug.
    /// Lookup failures never fail the batch; they become `NotFound` cells.
    pub async fn resolve_batch(
        &self,
        identifiers: &[String],
        stores: &[StoreTarget],
    ) -> Result<ResultTable, BatchError> {
        self.resolve_batch_with_progress(identifiers, stores, |_| {})
            .await
    }

    /// Like [`resolve_batch`](Self::resolve_batch), calling `on_progress`
    /// once per completed row with a strictly increasing `done` count.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] when the store set is empty or repeats a slug.
    pub async fn resolve_batch_with_progress<F>(
        &self,
        identifiers: &[String],
        stores: &[StoreTarget],
        mut on_progress: F,
    ) -> Result<ResultTable, BatchError>
    where
        F: FnMut(BatchProgress) + Send,
    {
        validate_batch_stores(stores)?;

        let total = identifiers.len();
        let limiter = Arc::new(Semaphore::new(self.config.max_concurrent_lookups.max(1)));
        let platforms = Arc::new(PlatformCache::new());
        tracing::info!(
            identifiers = total,
            stores = stores.len(),
            max_concurrent = self.config.max_concurrent_lookups,
            "starting batch"
        );

        let mut pending: FuturesUnordered<BoxFuture<'static, (usize, ResultRow)>> =
            FuturesUnordered::new();

        for (index, raw) in identifiers.iter().enumerate() {
            let identifier = normalize_identifier(raw);
            if identifier.is_empty() {
                tracing::debug!(row = index, raw = %raw, "identifier did not normalize");
                let row = ResultRow::unresolved(raw.trim().to_owned(), stores.len());
                pending.push(future::ready((index, row)).boxed());
                continue;
            }

            let lookups: Vec<JoinHandle<Resolution>> = stores
                .iter()
                .map(|store| {
                    self.spawn_lookup(
                        Arc::clone(&limiter),
                        Arc::clone(&platforms),
                        store.clone(),
                        identifier.clone(),
                    )
                })
                .collect();

            pending.push(
                async move {
                    let mut cells = Vec::with_capacity(lookups.len());
                    for outcome in future::join_all(lookups).await {
                        cells.push(outcome.unwrap_or_else(|error| {
                            tracing::warn!(error = %error, "lookup task failed");
                            Resolution::NotFound
                        }));
                    }
                    (index, ResultRow { identifier, cells })
                }
                .boxed(),
            );
        }

        let mut rows: Vec<Option<ResultRow>> = vec![None; total];
        let mut done = 0;
        while let Some((index, row)) = pending.next().await {
            rows[index] = Some(row);
            done += 1;
            on_progress(BatchProgress { done, total });
        }

        let table = ResultTable {
            stores: stores.iter().map(|s| s.slug.clone()).collect(),
            rows: rows.into_iter().flatten().collect(),
        };
        tracing::info!(
            identifiers = total,
            found = table.found_count(),
            cells = table.cell_count(),
            "batch finished"
        );
        Ok(table)
    }

    fn spawn_lookup(
        &self,
        limiter: Arc<Semaphore>,
        platforms: Arc<PlatformCache>,
        store: StoreTarget,
        identifier: String,
    ) -> JoinHandle<Resolution> {
        let transport = Arc::clone(&self.transport);
        let registry = Arc::clone(&self.registry);
        let resolver = self.resolvers.resolver_for(&store.slug);
        let timeout = self.config.store_timeout;

        tokio::spawn(async move {
            let Ok(_permit) = limiter.acquire_owned().await else {
                return Resolution::NotFound;
            };
            let ctx = ResolveContext {
                transport: transport.as_ref(),
                registry: registry.as_ref(),
                platforms: platforms.as_ref(),
            };
            match tokio::time::timeout(timeout, resolver.resolve(&ctx, &store, &identifier)).await
            {
                Ok(resolution) => resolution,
                Err(_) => {
                    tracing::warn!(
                        store = %store.slug,
                        identifier = %identifier,
                        timeout = ?timeout,
                        "store lookup timed out"
                    );
                    Resolution::NotFound
                }
            }
        })
    }
}

/// Reject store sets a batch cannot run against.
pub(crate) fn validate_batch_stores(stores: &[StoreTarget]) -> Result<(), BatchError> {
    if stores.is_empty() {
        return Err(BatchError::NoStores);
    }
    let mut seen = HashSet::new();
    for store in stores {
        if !seen.insert(store.slug.as_str()) {
            return Err(BatchError::DuplicateSlug(store.slug.clone()));
        }
    }
    Ok(())
}
