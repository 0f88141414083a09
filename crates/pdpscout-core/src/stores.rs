use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::Platform;
use crate::ConfigError;

const MAX_SLUG_LEN: usize = 40;

/// Where a store target came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOrigin {
    #[default]
    Predefined,
    UserSupplied,
}

/// Which resolver implementation handles a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// Classify the storefront and walk the per-platform strategy list.
    #[default]
    Generic,
    /// Marketplace search API with HTML listing fallback.
    MercadoLibre,
    /// Magento `catalogsearch` listing, first product tile wins.
    MagentoListing,
    /// PrestaShop search (JoliSearch module first), numeric-id product links.
    PrestashopListing,
}

impl ResolverKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResolverKind::Generic => "generic",
            ResolverKind::MercadoLibre => "mercado_libre",
            ResolverKind::MagentoListing => "magento_listing",
            ResolverKind::PrestashopListing => "prestashop_listing",
        }
    }
}

/// Whether a validated candidate must be confirmed by finding the identifier
/// in the candidate page body before it is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPolicy {
    /// Accept the first validated candidate without fetching it.
    #[default]
    Skip,
    /// Fetch the candidate; keep looking if the identifier is absent, but fall
    /// back to the first unverified candidate when nothing verifies.
    Prefer,
    /// Only accept candidates whose page contains the identifier.
    Require,
}

/// One e-commerce site a batch resolves identifiers against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTarget {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub origin: StoreOrigin,
    /// Known platform; skips the home-page classification fetch when set.
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub resolver: ResolverKind,
    #[serde(default)]
    pub verification: VerificationPolicy,
    /// Last path segments (e.g. `ofertas.html`) that look like product pages
    /// on this store but are category landings.
    #[serde(default)]
    pub banned_leafs: Vec<String>,
}

impl StoreTarget {
    /// A user-supplied store handled by the generic resolver.
    #[must_use]
    pub fn user_supplied(slug: impl Into<String>, base_url: &str) -> Self {
        let slug = slug.into();
        Self {
            name: slug.clone(),
            slug,
            base_url: normalize_base_url(base_url),
            origin: StoreOrigin::UserSupplied,
            platform: None,
            resolver: ResolverKind::Generic,
            verification: VerificationPolicy::Skip,
            banned_leafs: Vec::new(),
        }
    }

    /// Display name, falling back to the slug.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.slug
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreTarget>,
}

/// A store added by the user at batch-setup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomStore {
    #[serde(default)]
    pub name: String,
    pub url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown store slug '{0}'")]
    UnknownStore(String),

    #[error("invalid store URL \"{url}\": {reason}")]
    InvalidStoreUrl { url: String, reason: String },
}

/// Load and validate the predefined store catalog from a YAML file.
///
/// Base URLs are normalized on load.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_stores(&content)
}

pub(crate) fn parse_stores(content: &str) -> Result<StoresFile, ConfigError> {
    let mut stores_file: StoresFile =
        serde_yaml::from_str(content).map_err(ConfigError::StoresFileParse)?;

    for store in &mut stores_file.stores {
        store.base_url = normalize_base_url(&store.base_url);
        store.origin = StoreOrigin::Predefined;
    }

    validate_stores(&stores_file)?;
    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for store in &stores_file.stores {
        if store.slug.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store slug must be non-empty".to_string(),
            ));
        }

        if let Err(reason) = check_base_url(&store.base_url) {
            return Err(ConfigError::Validation(format!(
                "store '{}' has an invalid base_url \"{}\": {reason}",
                store.slug, store.base_url
            )));
        }

        if !seen_slugs.insert(store.slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store slug: '{}'",
                store.slug
            )));
        }
    }

    Ok(())
}

fn check_base_url(base_url: &str) -> Result<(), String> {
    let parsed = url::Url::parse(base_url).map_err(|e| e.to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", parsed.scheme()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}

/// Normalize a store base URL: trim, add `https://` when no scheme is given,
/// drop trailing slashes.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };
    with_scheme.trim_end_matches('/').to_string()
}

/// Generate a store slug from a display name: ASCII-folded, lower-case,
/// runs of other characters collapsed to `_`, at most 40 characters.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(c);
        if folded.is_ascii_alphanumeric() {
            slug.push(folded);
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug: String = slug.trim_matches('_').chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "store".to_string()
    } else {
        slug.to_string()
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Return `base` if unused, otherwise the first free `base_2`, `base_3`, ...
#[must_use]
pub fn unique_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|i| format!("{base}_{i}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Build the store set for one batch.
///
/// `selected` picks predefined stores by slug, in the given order; an empty
/// selection means every predefined store in catalog order. Custom stores are
/// always appended after the selection, with slugs derived from their name
/// (or host) and de-duplicated against every slug already in the batch.
///
/// # Errors
///
/// Returns [`SelectionError::UnknownStore`] for a selected slug missing from
/// the catalog and [`SelectionError::InvalidStoreUrl`] for an unusable custom
/// URL.
pub fn select_stores(
    catalog: &[StoreTarget],
    selected: &[String],
    custom: &[CustomStore],
) -> Result<Vec<StoreTarget>, SelectionError> {
    let mut targets: Vec<StoreTarget> = if selected.is_empty() {
        catalog.to_vec()
    } else {
        let mut picked = Vec::with_capacity(selected.len());
        let mut seen = HashSet::new();
        for slug in selected {
            let slug = slug.trim();
            if !seen.insert(slug.to_string()) {
                continue;
            }
            let store = catalog
                .iter()
                .find(|s| s.slug == slug)
                .ok_or_else(|| SelectionError::UnknownStore(slug.to_string()))?;
            picked.push(store.clone());
        }
        picked
    };

    let mut taken: HashSet<String> = catalog.iter().map(|s| s.slug.clone()).collect();
    for store in custom {
        let base_url = normalize_base_url(&store.url);
        check_base_url(&base_url).map_err(|reason| SelectionError::InvalidStoreUrl {
            url: store.url.clone(),
            reason,
        })?;

        let name = if store.name.trim().is_empty() {
            host_label(&base_url)
        } else {
            store.name.trim().to_string()
        };
        let slug = unique_slug(&slugify(&name), &taken);
        taken.insert(slug.clone());

        let mut target = StoreTarget::user_supplied(slug, &base_url);
        target.name = name;
        targets.push(target);
    }

    Ok(targets)
}

fn host_label(base_url: &str) -> String {
    url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| base_url.to_string())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
