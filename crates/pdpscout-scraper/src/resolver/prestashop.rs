use std::sync::LazyLock;

use async_trait::async_trait;
use pdpscout_core::StoreTarget;
use regex::Regex;

use super::verify::{check, Verdict};
use super::{ResolveContext, StoreResolver};
use crate::extract::{absolutize, find_canonical};
use crate::table::Resolution;
use crate::transport::fetch_text;
use crate::validate::host_matches;

/// Search results pages can be huge; product links sit near the top.
const MAX_SCAN_BYTES: usize = 600_000;

const BANNED_PATHS: [&str; 7] = [
    "/cart",
    "/login",
    "/my-account",
    "/account",
    "/checkout",
    "/wishlist",
    "/module/ambjolisearch/jolisearch",
];

static HTML_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href=["']([^"']+?\.html)(?:\?[^"']*)?["']"#).expect("valid regex")
});
static PRODUCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d{3,}[-/]|[-/]\d{3,}\.html$").expect("valid regex"));

/// PrestaShop search resolver.
///
/// Tries the `JoliSearch` module first, then the core search controller, then
/// the bare `?s=` query. A search that redirected straight to a product page
/// is caught through its canonical link.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrestaShopListingResolver;

impl PrestaShopListingResolver {
    fn search_urls(base: &str, identifier: &str) -> [String; 3] {
        [
            format!("{base}/module/ambjolisearch/jolisearch?s={identifier}"),
            format!("{base}/search?controller=search&s={identifier}"),
            format!("{base}/?s={identifier}"),
        ]
    }
}

#[async_trait]
impl StoreResolver for PrestaShopListingResolver {
    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
        store: &StoreTarget,
        identifier: &str,
    ) -> Resolution {
        let base = store.base_url.trim_end_matches('/');
        let mut unverified: Option<String> = None;

        for search_url in Self::search_urls(base, identifier) {
            let Some(html) = fetch_text(ctx.transport, &search_url).await else {
                continue;
            };
            let Some(candidate) = first_product_link(&html, base) else {
                continue;
            };
            match check(ctx.transport, store.verification, &candidate, identifier).await {
                Verdict::Accept => return Resolution::Found(candidate),
                Verdict::Fallback => {
                    unverified.get_or_insert(candidate);
                }
                Verdict::Reject => {}
            }
        }

        Resolution::from(unverified)
    }
}

/// Canonical product link, else the first qualifying `.html` href.
pub(crate) fn first_product_link(html: &str, base: &str) -> Option<String> {
    let html = truncate_at_char_boundary(html, MAX_SCAN_BYTES);

    if let Some(url) = find_canonical(html)
        .and_then(|href| absolutize(&href, base))
        .filter(|url| is_prestashop_product(url, base))
    {
        return Some(url);
    }

    HTML_HREF_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .filter_map(|m| absolutize(m.as_str(), base))
        .find(|url| is_prestashop_product(url, base))
}

fn is_prestashop_product(url: &str, base: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    if !parsed.host_str().is_some_and(|host| host_matches(host, base)) {
        return false;
    }
    let path = parsed.path().to_ascii_lowercase();
    if BANNED_PATHS.iter().any(|banned| path.contains(banned)) {
        return false;
    }
    path.ends_with(".html") && PRODUCT_ID_RE.is_match(&path)
}

fn truncate_at_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
