use async_trait::async_trait;
use pdpscout_core::StoreTarget;
use scraper::Html;

use super::verify::pick;
use super::{ResolveContext, StoreResolver};
use crate::extract::{absolutize, select_attr};
use crate::table::Resolution;
use crate::transport::fetch_text;
use crate::validate::{contains_denylisted, host_matches};

/// Product-tile selectors, most specific first.
const TILE_SELECTORS: [&str; 3] = [
    "a.product-item-link[href]",
    "li.product-item a[href], ol.products a[href]",
    "a[href]",
];

/// Magento `catalogsearch` listing resolver.
///
/// Ranks every same-store `.html` link on the results page, product tiles
/// first, and hands the ranked list to the store's verification policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagentoListingResolver;

#[async_trait]
impl StoreResolver for MagentoListingResolver {
    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        store: &StoreTarget,
        identifier: &str,
    ) -> Resolution {
        let base = store.base_url.trim_end_matches('/');
        let search_url = format!("{base}/catalogsearch/result/?q={identifier}");

        let Some(html) = fetch_text(ctx.transport, &search_url).await else {
            return Resolution::NotFound;
        };
        let candidates = listing_candidates(&html, base, &store.banned_leafs);
        tracing::debug!(
            store = %store.slug,
            identifier,
            candidates = candidates.len(),
            "ranked listing candidates"
        );

        pick(ctx.transport, store.verification, candidates, identifier)
            .await
            .into()
    }
}

/// Same-store `.html` product links in rank order, de-duplicated.
pub(crate) fn listing_candidates(html: &str, base: &str, banned_leafs: &[String]) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut ranked: Vec<String> = Vec::new();

    for css in TILE_SELECTORS {
        for href in select_attr(&document, css, "href") {
            let Some(url) = absolutize(&href, base) else {
                continue;
            };
            if is_listing_product(&url, base, banned_leafs) && !ranked.contains(&url) {
                ranked.push(url);
            }
        }
    }

    ranked
}

fn is_listing_product(url: &str, base: &str, banned_leafs: &[String]) -> bool {
    if contains_denylisted(url) {
        return false;
    }
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    if !parsed.host_str().is_some_and(|host| host_matches(host, base)) {
        return false;
    }
    let path = parsed.path().to_ascii_lowercase();
    let leaf = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if banned_leafs.iter().any(|banned| banned.eq_ignore_ascii_case(leaf)) {
        return false;
    }
    path.ends_with(".html")
}
