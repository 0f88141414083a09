//! Product-detail-page URL validation.

use pdpscout_core::Platform;
use url::Url;

/// Fragments that mark account, cart, help or search pages.
const DENYLIST: [&str; 15] = [
    "/login",
    "/account",
    "/my-account",
    "/customer",
    "/cart",
    "/minicart",
    "/checkout",
    "/wishlist",
    "/orders",
    "#/orders",
    "/help",
    "/ayuda",
    "/support",
    "_q=",
    "map=ft",
];

const PRODUCTISH_SEGMENTS: [&str; 4] = ["/product", "/producto", "/products", "/productos"];

/// Decide whether `url` is a product detail page of the store at `base`.
///
/// `base` may be a full base URL or a bare host. Rules apply in order:
/// denylisted fragment, host mismatch, then the platform's path shape.
#[must_use]
pub fn is_product_page(url: &str, base: &str, platform: Platform) -> bool {
    if contains_denylisted(url) {
        return false;
    }
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    if !host_matches(host, base) {
        return false;
    }
    path_has_product_shape(&parsed.path().to_ascii_lowercase(), platform)
}

pub(crate) fn contains_denylisted(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    DENYLIST.iter().any(|fragment| lowered.contains(fragment))
}

/// Lower-cased host of a base URL or bare host.
pub(crate) fn base_host(base: &str) -> Option<String> {
    let trimmed = base.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };
    Url::parse(&with_scheme)
        .ok()?
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_ascii_lowercase)
}

/// `host` equals the base host or is a subdomain of it. A leading `www.` on
/// the base is ignored, so `www.store.com` bases also accept `store.com`.
pub(crate) fn host_matches(host: &str, base: &str) -> bool {
    let Some(base) = base_host(base) else {
        return false;
    };
    let base = base.strip_prefix("www.").unwrap_or(&base);
    let host = host.to_ascii_lowercase();
    host == base
        || host
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn path_has_product_shape(path: &str, platform: Platform) -> bool {
    match platform {
        Platform::Vtex => path.trim_end_matches('/').ends_with("/p"),
        Platform::Magento | Platform::PrestaShop => path.ends_with(".html"),
        Platform::Shopify => path.contains("/products/"),
        Platform::WooCommerce => {
            path.contains("/product/") && !path.contains("/product-category/")
        }
        Platform::TiendaNube => path.contains("/productos/") && !path.contains("/colecciones/"),
        Platform::Unknown => {
            PRODUCTISH_SEGMENTS.iter().any(|s| path.contains(s)) || path.ends_with(".html")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vtex_product_path_on_store_host_is_accepted() {
        assert!(is_product_page(
            "https://store.com/some-product/p",
            "store.com",
            Platform::Vtex
        ));
        assert!(is_product_page(
            "https://www.store.com/some-product/p/",
            "https://www.store.com",
            Platform::Vtex
        ));
    }

    #[test]
    fn denylisted_paths_are_rejected() {
        assert!(!is_product_page(
            "https://store.com/account/orders",
            "store.com",
            Platform::Vtex
        ));
        assert!(!is_product_page(
            "https://store.com/cart/p",
            "store.com",
            Platform::Vtex
        ));
        assert!(!is_product_page(
            "https://store.com/LOGIN/p",
            "store.com",
            Platform::Vtex
        ));
        assert!(!is_product_page(
            "https://store.com/busca?_q=123&map=ft/p",
            "store.com",
            Platform::Vtex
        ));
    }

    #[test]
    fn cross_host_urls_are_rejected() {
        assert!(!is_product_page(
            "https://other.com/some-product/p",
            "store.com",
            Platform::Vtex
        ));
        assert!(!is_product_page(
            "https://notstore.com/some-product/p",
            "store.com",
            Platform::Vtex
        ));
    }

    #[test]
    fn subdomains_of_the_base_host_are_accepted() {
        assert!(is_product_page(
            "https://shop.store.com/some-product/p",
            "https://www.store.com",
            Platform::Vtex
        ));
    }

    #[test]
    fn path_shapes_follow_platform() {
        let base = "https://shop.test";
        assert!(is_product_page("https://shop.test/jabon-123.html", base, Platform::Magento));
        assert!(!is_product_page("https://shop.test/jabon-123", base, Platform::Magento));
        assert!(is_product_page("https://shop.test/10-jabon.html", base, Platform::PrestaShop));
        assert!(is_product_page("https://shop.test/products/jabon", base, Platform::Shopify));
        assert!(!is_product_page("https://shop.test/collections/all", base, Platform::Shopify));
        assert!(is_product_page("https://shop.test/product/jabon/", base, Platform::WooCommerce));
        assert!(!is_product_page(
            "https://shop.test/product-category/jabon/",
            base,
            Platform::WooCommerce
        ));
        assert!(is_product_page("https://shop.test/productos/jabon/", base, Platform::TiendaNube));
        assert!(!is_product_page(
            "https://shop.test/colecciones/productos/jabon/",
            base,
            Platform::TiendaNube
        ));
    }

    #[test]
    fn unknown_platform_accepts_productish_or_html_paths() {
        let base = "https://shop.test";
        assert!(is_product_page("https://shop.test/producto/jabon", base, Platform::Unknown));
        assert!(is_product_page("https://shop.test/jabon.html", base, Platform::Unknown));
        assert!(!is_product_page("https://shop.test/jabon", base, Platform::Unknown));
    }

    #[test]
    fn unparseable_or_non_http_urls_are_rejected() {
        assert!(!is_product_page("not a url", "shop.test", Platform::Unknown));
        assert!(!is_product_page("mailto:x@shop.test", "shop.test", Platform::Unknown));
    }
}
