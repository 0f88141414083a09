#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pdpscout_core::{Platform, StoreTarget, VerificationPolicy};
use pdpscout_scraper::{
    EngineConfig, HttpTransport, ResolutionEngine, ResolverTable, StrategyRegistry,
    TransportConfig,
};

/// Real HTTP transport with a short timeout and a recognizable UA.
pub fn test_transport() -> HttpTransport {
    HttpTransport::new(&TransportConfig {
        request_timeout: Duration::from_secs(5),
        user_agent: "pdpscout-test/0.1".to_string(),
        accept_language: "es-AR,es;q=0.9".to_string(),
    })
    .expect("failed to build test transport")
}

/// A generic store pointing at `base_url`, optionally with a platform hint.
pub fn store(slug: &str, base_url: &str, platform: Option<Platform>) -> StoreTarget {
    let mut store = StoreTarget::user_supplied(slug, base_url);
    store.platform = platform;
    store
}

pub fn store_with_policy(
    slug: &str,
    base_url: &str,
    platform: Option<Platform>,
    verification: VerificationPolicy,
) -> StoreTarget {
    let mut store = store(slug, base_url, platform);
    store.verification = verification;
    store
}

pub fn engine(stores: &[StoreTarget], config: EngineConfig) -> ResolutionEngine {
    ResolutionEngine::new(
        Arc::new(test_transport()),
        Arc::new(StrategyRegistry::new()),
        Arc::new(ResolverTable::from_stores(stores)),
        config,
    )
}

pub fn html_page(body: &str) -> String {
    format!("<!doctype html><html><head><title>t</title></head><body>{body}</body></html>")
}
