use serde::{Deserialize, Serialize};

/// Storefront software family behind a store. Determines which search
/// endpoints exist and what a product-detail URL looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Vtex,
    Magento,
    PrestaShop,
    Shopify,
    WooCommerce,
    TiendaNube,
    Unknown,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Vtex,
        Platform::Magento,
        Platform::PrestaShop,
        Platform::Shopify,
        Platform::WooCommerce,
        Platform::TiendaNube,
        Platform::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Vtex => "vtex",
            Platform::Magento => "magento",
            Platform::PrestaShop => "prestashop",
            Platform::Shopify => "shopify",
            Platform::WooCommerce => "woocommerce",
            Platform::TiendaNube => "tiendanube",
            Platform::Unknown => "unknown",
        }
    }

    /// Path suffix appended to relative catalog-API links to form a product
    /// page URL (`/p` on VTEX). `None` for platforms without a catalog API.
    #[must_use]
    pub fn product_path_suffix(self) -> Option<&'static str> {
        match self {
            Platform::Vtex => Some("/p"),
            Platform::Magento
            | Platform::PrestaShop
            | Platform::Shopify
            | Platform::WooCommerce
            | Platform::TiendaNube
            | Platform::Unknown => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| format!("unknown platform '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.to_string().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("VTEX".parse::<Platform>().unwrap(), Platform::Vtex);
        assert_eq!(" TiendaNube ".parse::<Platform>().unwrap(), Platform::TiendaNube);
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert!("wix".parse::<Platform>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Platform::PrestaShop).unwrap();
        assert_eq!(json, "\"prestashop\"");
        let parsed: Platform = serde_json::from_str("\"woocommerce\"").unwrap();
        assert_eq!(parsed, Platform::WooCommerce);
    }

    #[test]
    fn only_vtex_has_a_product_path_suffix() {
        assert_eq!(Platform::Vtex.product_path_suffix(), Some("/p"));
        for platform in Platform::ALL.into_iter().filter(|p| *p != Platform::Vtex) {
            assert_eq!(platform.product_path_suffix(), None);
        }
    }
}
