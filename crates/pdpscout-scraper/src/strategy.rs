//! Per-platform search URL templates.

use pdpscout_core::Platform;

/// How a lookup response is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Catalog API result set; the first record's link is trusted.
    Json,
    /// Search results page; candidates are extracted and validated.
    Html,
}

/// One way of searching a store for an identifier.
#[derive(Debug, Clone, Copy)]
pub struct LookupStrategy {
    pub name: &'static str,
    pub kind: ResponseKind,
    build: fn(&str, &str) -> String,
}

impl LookupStrategy {
    const fn new(name: &'static str, kind: ResponseKind, build: fn(&str, &str) -> String) -> Self {
        Self { name, kind, build }
    }

    /// Build the lookup URL for `identifier` on the store at `base_url`.
    #[must_use]
    pub fn url(&self, base_url: &str, identifier: &str) -> String {
        (self.build)(base_url.trim_end_matches('/'), identifier)
    }
}

/// Ordered lookup strategies for every platform.
///
/// Built once and shared by all lookups of the engine.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    vtex: Vec<LookupStrategy>,
    magento: Vec<LookupStrategy>,
    prestashop: Vec<LookupStrategy>,
    shopify: Vec<LookupStrategy>,
    woocommerce: Vec<LookupStrategy>,
    tiendanube: Vec<LookupStrategy>,
    unknown: Vec<LookupStrategy>,
}

impl StrategyRegistry {
    #[must_use]
    pub fn new() -> Self {
        use ResponseKind::{Html, Json};

        Self {
            vtex: vec![
                LookupStrategy::new("vtex_ean", Json, |b: &str, q: &str| {
                    format!("{b}/api/catalog_system/pub/products/search/?fq=alternateIds_Ean:{q}")
                }),
                LookupStrategy::new("vtex_fulltext", Json, |b: &str, q: &str| {
                    format!("{b}/api/catalog_system/pub/products/search/?ft={q}")
                }),
                LookupStrategy::new("vtex_search_page", Html, |b: &str, q: &str| {
                    format!("{b}/{q}?_q={q}&map=ft")
                }),
            ],
            magento: vec![LookupStrategy::new(
                "magento_catalogsearch",
                Html,
                |b: &str, q: &str| format!("{b}/catalogsearch/result/?q={q}"),
            )],
            prestashop: vec![
                LookupStrategy::new("prestashop_jolisearch", Html, |b: &str, q: &str| {
                    format!("{b}/module/ambjolisearch/jolisearch?s={q}")
                }),
                LookupStrategy::new("prestashop_search", Html, |b: &str, q: &str| {
                    format!("{b}/search?controller=search&s={q}")
                }),
                LookupStrategy::new("prestashop_query", Html, |b: &str, q: &str| {
                    format!("{b}/?s={q}")
                }),
            ],
            shopify: vec![
                LookupStrategy::new("shopify_search", Html, |b: &str, q: &str| {
                    format!("{b}/search?q={q}")
                }),
                LookupStrategy::new("shopify_search_products", Html, |b: &str, q: &str| {
                    format!("{b}/search/products?q={q}")
                }),
            ],
            woocommerce: vec![
                LookupStrategy::new("woocommerce_search", Html, |b: &str, q: &str| {
                    format!("{b}/?s={q}")
                }),
                LookupStrategy::new("woocommerce_product_search", Html, |b: &str, q: &str| {
                    format!("{b}/?post_type=product&s={q}")
                }),
            ],
            tiendanube: vec![
                LookupStrategy::new("tiendanube_buscar", Html, |b: &str, q: &str| {
                    format!("{b}/buscar?q={q}")
                }),
                LookupStrategy::new("tiendanube_search", Html, |b: &str, q: &str| {
                    format!("{b}/search?q={q}")
                }),
            ],
            unknown: vec![
                LookupStrategy::new("search", Html, |b: &str, q: &str| {
                    format!("{b}/search?q={q}")
                }),
                LookupStrategy::new("buscar", Html, |b: &str, q: &str| {
                    format!("{b}/buscar?q={q}")
                }),
                LookupStrategy::new("busca", Html, |b: &str, q: &str| {
                    format!("{b}/busca?q={q}")
                }),
                LookupStrategy::new("catalogsearch", Html, |b: &str, q: &str| {
                    format!("{b}/catalogsearch/result/?q={q}")
                }),
                LookupStrategy::new("wp_search", Html, |b: &str, q: &str| {
                    format!("{b}/?s={q}")
                }),
                LookupStrategy::new("query", Html, |b: &str, q: &str| {
                    format!("{b}/?q={q}")
                }),
            ],
        }
    }

    /// Strategies to try for `platform`, in priority order.
    #[must_use]
    pub fn strategies_for(&self, platform: Platform) -> &[LookupStrategy] {
        match platform {
            Platform::Vtex => &self.vtex,
            Platform::Magento => &self.magento,
            Platform::PrestaShop => &self.prestashop,
            Platform::Shopify => &self.shopify,
            Platform::WooCommerce => &self.woocommerce,
            Platform::TiendaNube => &self.tiendanube,
            Platform::Unknown => &self.unknown,
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
