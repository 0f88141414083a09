//! Per-store lookup logic.
//!
//! Most stores go through [`GenericResolver`]: classify the storefront, walk
//! the platform's strategies, extract and validate. Stores whose search pages
//! defeat the generic passes get a dedicated resolver, selected by slug.

mod generic;
mod magento;
mod mercadolibre;
mod prestashop;
mod verify;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use pdpscout_core::{Platform, ResolverKind, StoreTarget};
use tokio::sync::OnceCell;

use crate::strategy::StrategyRegistry;
use crate::table::Resolution;
use crate::transport::Transport;

pub use generic::GenericResolver;
pub use magento::MagentoListingResolver;
pub use mercadolibre::MercadoLibreResolver;
pub use prestashop::PrestaShopListingResolver;

/// Shared services available to a resolver during one lookup.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub transport: &'a dyn Transport,
    pub registry: &'a StrategyRegistry,
    pub platforms: &'a PlatformCache,
}

/// Storefront platforms detected during one batch, keyed by store slug.
///
/// Concurrent lookups against the same store share one detection.
#[derive(Debug, Default)]
pub struct PlatformCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<Platform>>>>,
}

impl PlatformCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn slot(&self, slug: &str) -> Arc<OnceCell<Platform>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(slug.to_owned()).or_default())
    }
}

#[async_trait]
pub trait StoreResolver: Send + Sync {
    /// Find the product page for `identifier` (already normalized, non-empty)
    /// on `store`. Every failure along the way degrades to
    /// [`Resolution::NotFound`].
    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        store: &StoreTarget,
        identifier: &str,
    ) -> Resolution;
}

/// Resolver dispatch keyed on store slug, falling back to [`GenericResolver`].
#[derive(Clone)]
pub struct ResolverTable {
    by_slug: HashMap<String, Arc<dyn StoreResolver>>,
    fallback: Arc<dyn StoreResolver>,
}

impl ResolverTable {
    /// A table that sends every store to the generic resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_slug: HashMap::new(),
            fallback: Arc::new(GenericResolver),
        }
    }

    /// Register the resolver each store's [`ResolverKind`] names.
    #[must_use]
    pub fn from_stores(stores: &[StoreTarget]) -> Self {
        let mut table = Self::new();
        for store in stores {
            let resolver: Arc<dyn StoreResolver> = match store.resolver {
                ResolverKind::Generic => continue,
                ResolverKind::MercadoLibre => Arc::new(MercadoLibreResolver::default()),
                ResolverKind::MagentoListing => Arc::new(MagentoListingResolver),
                ResolverKind::PrestashopListing => Arc::new(PrestaShopListingResolver),
            };
            table.insert(store.slug.clone(), resolver);
        }
        table
    }

    pub fn insert(&mut self, slug: impl Into<String>, resolver: Arc<dyn StoreResolver>) {
        self.by_slug.insert(slug.into(), resolver);
    }

    #[must_use]
    pub fn resolver_for(&self, slug: &str) -> Arc<dyn StoreResolver> {
        self.by_slug
            .get(slug)
            .map_or_else(|| Arc::clone(&self.fallback), Arc::clone)
    }
}

impl Default for ResolverTable {
    fn default() -> Self {
        Self::new()
    }
}
