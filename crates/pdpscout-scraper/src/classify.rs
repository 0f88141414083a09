//! Storefront platform detection from page HTML.

use pdpscout_core::Platform;

/// Ordered signature table; the first platform with a matching marker wins.
const SIGNATURES: [(Platform, &[&str]); 6] = [
    (Platform::Vtex, &["vtex", "/api/catalog_system/", "vtexassets"]),
    (Platform::Magento, &["magento", "mage-init", "data-mage"]),
    (Platform::PrestaShop, &["prestashop", "jolisearch"]),
    (Platform::Shopify, &["cdn.shopify.com", "shopify"]),
    (
        Platform::WooCommerce,
        &["woocommerce", "wp-content", "wc-add-to-cart"],
    ),
    (Platform::TiendaNube, &["tiendanube", "nuvemshop"]),
];

/// Classify a storefront by case-insensitive marker search over its HTML.
///
/// Returns [`Platform::Unknown`] for empty input or when no marker matches.
#[must_use]
pub fn classify_platform(html: &str) -> Platform {
    if html.trim().is_empty() {
        return Platform::Unknown;
    }
    let lowered = html.to_ascii_lowercase();
    SIGNATURES
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| lowered.contains(m)))
        .map_or(Platform::Unknown, |(platform, _)| *platform)
}
