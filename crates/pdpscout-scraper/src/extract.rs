//! Candidate product-page URL extraction from lookup responses.
//!
//! Catalog API links are trusted as-is; everything pulled out of HTML goes
//! through [`is_product_page`] before it becomes a candidate.

use std::sync::LazyLock;

use pdpscout_core::Platform;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use crate::validate::is_product_page;

static JSONLD_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

/// Where a candidate URL was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    CatalogApi,
    Canonical,
    StructuredData,
    Anchor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub source: CandidateSource,
}

/// Resolve `href` against the store base URL.
///
/// Protocol-relative links get `https:`, absolute links are kept, anything
/// else is joined onto `{base}/`. Empty, fragment-only and non-HTTP links
/// (`mailto:`, `javascript:`) yield `None`.
#[must_use]
pub fn absolutize(href: &str, base_url: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if is_absolute_http(href) {
        return Some(href.to_owned());
    }
    let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/'))).ok()?;
    let joined = base.join(href).ok()?;
    matches!(joined.scheme(), "http" | "https").then(|| joined.to_string())
}

fn is_absolute_http(value: &str) -> bool {
    let lowered = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Compose the product URL from the first record of a catalog API result set.
///
/// Reads `link`, then `linkText`. Relative values are appended to the base
/// URL, plus the platform's product-path suffix when missing.
#[must_use]
pub fn extract_api_candidate(
    payload: &Value,
    base_url: &str,
    platform: Platform,
) -> Option<Candidate> {
    let first = payload.as_array()?.first()?;
    let link = ["link", "linkText"].iter().find_map(|key| {
        first
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })?;

    Some(Candidate {
        url: compose_api_link(link, base_url, platform),
        source: CandidateSource::CatalogApi,
    })
}

fn compose_api_link(link: &str, base_url: &str, platform: Platform) -> String {
    if is_absolute_http(link) {
        return link.to_owned();
    }
    let url = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        link.trim_start_matches('/')
    );
    match platform.product_path_suffix() {
        Some(suffix) if !url.trim_end_matches('/').ends_with(suffix) => {
            format!("{}{suffix}", url.trim_end_matches('/'))
        }
        _ => url,
    }
}

/// Find the first validated product URL in a search results page.
///
/// Passes, first hit wins: canonical link, JSON-LD `ItemList` entries, then
/// anchors in document order.
#[must_use]
pub fn extract_html_candidate(html: &str, base_url: &str, platform: Platform) -> Option<Candidate> {
    let accept = |href: &str| {
        absolutize(href, base_url).filter(|url| is_product_page(url, base_url, platform))
    };

    let document = Html::parse_document(html);

    if let Some(url) = canonical_href(&document).as_deref().and_then(accept) {
        return Some(Candidate {
            url,
            source: CandidateSource::Canonical,
        });
    }

    if let Some(url) = item_list_urls(html).iter().find_map(|href| accept(href)) {
        return Some(Candidate {
            url,
            source: CandidateSource::StructuredData,
        });
    }

    select_attr(&document, "a[href]", "href")
        .iter()
        .find_map(|href| accept(href))
        .map(|url| Candidate {
            url,
            source: CandidateSource::Anchor,
        })
}

/// The page's `<link rel="canonical">` href, unresolved.
pub(crate) fn find_canonical(html: &str) -> Option<String> {
    canonical_href(&Html::parse_document(html))
}

fn canonical_href(document: &Html) -> Option<String> {
    let Ok(selector) = Selector::parse("link[rel][href]") else {
        return None;
    };
    document
        .select(&selector)
        .filter(|el| {
            el.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("canonical"))
            })
        })
        .find_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_owned)
}

/// Values of `attr` on every element matching `css`, in document order.
pub(crate) fn select_attr(document: &Html, css: &str, attr: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect()
}

/// First entry URL of every JSON-LD `ItemList`/`CollectionPage` on the page.
fn item_list_urls(html: &str) -> Vec<String> {
    let mut urls = Vec::new();

    for cap in JSONLD_SCRIPT_RE.captures_iter(html) {
        let Some(json_text) = cap.get(1) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(json_text.as_str().trim()) else {
            continue;
        };

        let mut nodes: Vec<&Value> = match &value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        let graphs: Vec<&Value> = nodes
            .iter()
            .copied()
            .filter_map(|node| node.get("@graph").and_then(Value::as_array))
            .flatten()
            .collect();
        nodes.extend(graphs);

        for node in nodes {
            if let Some(url) = first_list_entry_url(node) {
                urls.push(url);
            }
        }
    }

    urls
}

fn first_list_entry_url(node: &Value) -> Option<String> {
    if !has_type(node, &["ItemList", "CollectionPage"]) {
        return None;
    }
    let list = node
        .get("itemListElement")
        .or_else(|| node.get("mainEntity").and_then(|m| m.get("itemListElement")))?;
    let entry = match list {
        Value::Array(entries) => entries.first()?,
        single => single,
    };

    let item = entry.get("item");
    [
        entry.get("url"),
        item.and_then(|i| i.get("url")),
        item.and_then(|i| i.get("@id")),
        item.filter(|i| i.is_string()),
    ]
    .into_iter()
    .flatten()
    .find_map(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

fn has_type(node: &Value, wanted: &[&str]) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => wanted.contains(&t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| wanted.contains(&t)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
