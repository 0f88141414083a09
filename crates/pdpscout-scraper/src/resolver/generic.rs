use async_trait::async_trait;
use pdpscout_core::{Platform, StoreTarget};

use super::verify::{check, Verdict};
use super::{ResolveContext, StoreResolver};
use crate::classify::classify_platform;
use crate::extract::{extract_api_candidate, extract_html_candidate};
use crate::strategy::ResponseKind;
use crate::table::Resolution;
use crate::transport::{fetch_json, fetch_text};

/// Platform-driven resolver used for every store without a dedicated one.
///
/// Walks the platform's strategies in order. Catalog API hits are accepted
/// as-is; search page candidates must validate and then pass the store's
/// verification policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericResolver;

impl GenericResolver {
    /// The store's platform hint, else the platform detected for this store
    /// earlier in the batch, else a fresh classification.
    async fn detect_platform(
        ctx: &ResolveContext<'_>,
        store: &StoreTarget,
        identifier: &str,
    ) -> Platform {
        if let Some(platform) = store.platform {
            return platform;
        }

        let slot = ctx.platforms.slot(&store.slug);
        *slot
            .get_or_init(|| Self::classify_storefront(ctx, store, identifier))
            .await
    }

    /// Classify the home page, else the first generic search page.
    async fn classify_storefront(
        ctx: &ResolveContext<'_>,
        store: &StoreTarget,
        identifier: &str,
    ) -> Platform {
        let base = store.base_url.trim_end_matches('/');
        let html = match fetch_text(ctx.transport, base).await {
            Some(html) => Some(html),
            None => match ctx.registry.strategies_for(Platform::Unknown).first() {
                Some(strategy) => fetch_text(ctx.transport, &strategy.url(base, identifier)).await,
                None => None,
            },
        };

        let platform = html.as_deref().map_or(Platform::Unknown, classify_platform);
        tracing::debug!(store = %store.slug, %platform, "classified storefront");
        platform
    }
}

#[async_trait]
impl StoreResolver for GenericResolver {
    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        store: &StoreTarget,
        identifier: &str,
    ) -> Resolution {
        let base = store.base_url.trim_end_matches('/');
        let platform = Self::detect_platform(ctx, store, identifier).await;
        let mut unverified: Option<String> = None;

        for strategy in ctx.registry.strategies_for(platform) {
            let url = strategy.url(base, identifier);

            let candidate = match strategy.kind {
                ResponseKind::Json => {
                    let Some(payload) = fetch_json(ctx.transport, &url).await else {
                        continue;
                    };
                    if let Some(candidate) = extract_api_candidate(&payload, base, platform) {
                        tracing::debug!(
                            store = %store.slug,
                            identifier,
                            strategy = strategy.name,
                            url = %candidate.url,
                            "catalog API match"
                        );
                        return Resolution::Found(candidate.url);
                    }
                    continue;
                }
                ResponseKind::Html => {
                    let Some(html) = fetch_text(ctx.transport, &url).await else {
                        continue;
                    };
                    match extract_html_candidate(&html, base, platform) {
                        Some(candidate) => candidate,
                        None => continue,
                    }
                }
            };

            match check(ctx.transport, store.verification, &candidate.url, identifier).await {
                Verdict::Accept => {
                    tracing::debug!(
                        store = %store.slug,
                        identifier,
                        strategy = strategy.name,
                        source = ?candidate.source,
                        url = %candidate.url,
                        "search page match"
                    );
                    return Resolution::Found(candidate.url);
                }
                Verdict::Fallback => {
                    unverified.get_or_insert(candidate.url);
                }
                Verdict::Reject => {}
            }
        }

        if unverified.is_none() {
            tracing::debug!(store = %store.slug, identifier, %platform, "no product page found");
        }
        Resolution::from(unverified)
    }
}
