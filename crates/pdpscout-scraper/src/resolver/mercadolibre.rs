use async_trait::async_trait;
use pdpscout_core::StoreTarget;
use scraper::Html;
use serde_json::Value;

use super::verify::{check, Verdict};
use super::{ResolveContext, StoreResolver};
use crate::extract::{absolutize, select_attr};
use crate::table::Resolution;
use crate::transport::{fetch_json, fetch_text};

const DEFAULT_API_BASE: &str = "https://api.mercadolibre.com";
const DEFAULT_LISTING_BASE: &str = "https://www.mercadolibre.com.ar";
const DEFAULT_HOST_MARKER: &str = "mercadolibre";

const ITEM_PATH_MARKERS: [&str; 4] = ["/MLA-", "/p/MLA", "/item/", "/up/MLA"];
const BANNED_FRAGMENTS: [&str; 5] = ["/login", "/account", "/ayuda", "/help", "/seguridad"];
const DATA_LINK_ATTRS: [&str; 3] = ["data-url", "data-href", "data-link"];

/// Marketplace resolver: public search API first, then listing pages.
#[derive(Debug, Clone)]
pub struct MercadoLibreResolver {
    api_base: String,
    listing_base: String,
    host_marker: String,
}

impl MercadoLibreResolver {
    /// `api_base` serves `/sites/MLA/search`; `listing_base` is the listing
    /// host tried after the store's own base URL; item links must have a host
    /// containing `host_marker`.
    #[must_use]
    pub fn new(
        api_base: impl Into<String>,
        listing_base: impl Into<String>,
        host_marker: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            listing_base: listing_base.into().trim_end_matches('/').to_owned(),
            host_marker: host_marker.into(),
        }
    }

    async fn search_api(&self, ctx: &ResolveContext<'_>, identifier: &str) -> Option<String> {
        let url = format!(
            "{}/sites/MLA/search?q={identifier}&limit=1",
            self.api_base
        );
        let payload = fetch_json(ctx.transport, &url).await?;
        payload
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|first| first.get("permalink"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|permalink| !permalink.is_empty())
            .map(str::to_owned)
    }

    fn listing_urls(&self, store_base: &str, identifier: &str) -> Vec<String> {
        let mut bases = vec![store_base.trim_end_matches('/')];
        if !bases.contains(&self.listing_base.as_str()) {
            bases.push(self.listing_base.as_str());
        }

        let paths = [
            format!("/{identifier}"),
            format!("/jm/search?as_word={identifier}"),
            format!("/ofertas?query={identifier}"),
        ];

        bases
            .iter()
            .flat_map(|base| paths.iter().map(move |path| format!("{base}{path}")))
            .collect()
    }

    /// First item link on a listing page: anchors, then `data-*` link
    /// attributes.
    fn find_item_link(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        let anchors = select_attr(&document, "a[href]", "href");
        let data_links = DATA_LINK_ATTRS
            .iter()
            .flat_map(|attr| select_attr(&document, &format!("[{attr}]"), attr));

        anchors
            .into_iter()
            .chain(data_links)
            .filter_map(|href| absolutize(&href, &self.listing_base))
            .find(|url| self.is_item_url(url))
    }

    fn is_item_url(&self, url: &str) -> bool {
        let Ok(parsed) = url::Url::parse(url) else {
            return false;
        };
        let host_ok = parsed
            .host_str()
            .is_some_and(|host| host.contains(&self.host_marker));
        let path = parsed.path();
        let lowered = url.to_ascii_lowercase();

        host_ok
            && ITEM_PATH_MARKERS.iter().any(|marker| path.contains(marker))
            && !BANNED_FRAGMENTS.iter().any(|banned| lowered.contains(banned))
    }
}

impl Default for MercadoLibreResolver {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_LISTING_BASE, DEFAULT_HOST_MARKER)
    }
}

#[async_trait]
impl StoreResolver for MercadoLibreResolver {
    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        store: &StoreTarget,
        identifier: &str,
    ) -> Resolution {
        if let Some(permalink) = self.search_api(ctx, identifier).await {
            tracing::debug!(store = %store.slug, identifier, url = %permalink, "search API match");
            return Resolution::Found(permalink);
        }

        // Listing matches go through the store's verification policy; the
        // API permalink above is an exact lookup and does not.
        let mut unverified: Option<String> = None;
        for listing_url in self.listing_urls(&store.base_url, identifier) {
            let Some(html) = fetch_text(ctx.transport, &listing_url).await else {
                continue;
            };
            let Some(url) = self.find_item_link(&html) else {
                continue;
            };
            match check(ctx.transport, store.verification, &url, identifier).await {
                Verdict::Accept => {
                    tracing::debug!(store = %store.slug, identifier, url = %url, "listing match");
                    return Resolution::Found(url);
                }
                Verdict::Fallback => {
                    unverified.get_or_insert(url);
                }
                Verdict::Reject => {}
            }
        }

        Resolution::from(unverified)
    }
}
