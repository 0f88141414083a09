//! Command handlers for resolving identifiers and inspecting stores.
//!
//! These are called from `main` once configuration is loaded. Lookup failures
//! never abort a run; they surface as `NotFound` cells in the output table.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use pdpscout_core::{AppConfig, CustomStore, StoreTarget};
use pdpscout_scraper::{BatchProgress, HttpTransport, ResolutionEngine, Transport, TransportConfig};

use crate::input::read_identifiers_from_path;
use crate::output::{write_table, OutputFormat};

/// Arguments for one `resolve` run.
#[derive(Debug)]
pub(crate) struct ResolveArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub stores: Vec<String>,
    pub custom_stores: Vec<CustomStore>,
}

/// Parse a `--custom-store` value: `NAME=URL`, or a bare URL whose name is
/// derived from its host.
pub(crate) fn parse_custom_store(raw: &str) -> Result<CustomStore, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("custom store must not be empty".to_string());
    }

    let (name, url) = match raw.split_once('=') {
        Some((name, url)) if !name.contains("://") => (name.trim(), url.trim()),
        _ => ("", raw),
    };
    if url.is_empty() {
        return Err(format!("custom store '{raw}' has no URL"));
    }

    Ok(CustomStore {
        name: name.to_string(),
        url: url.to_string(),
    })
}

fn load_catalog(config: &AppConfig) -> anyhow::Result<Vec<StoreTarget>> {
    let file = pdpscout_core::load_stores(&config.stores_path).with_context(|| {
        format!(
            "failed to load store catalog from {}",
            config.stores_path.display()
        )
    })?;
    Ok(file.stores)
}

/// Emit roughly twenty progress lines per batch, plus the final one.
fn progress_logger(total: usize) -> impl FnMut(BatchProgress) + Send {
    let step = (total / 20).max(1);
    move |progress: BatchProgress| {
        if progress.done % step == 0 || progress.done == progress.total {
            tracing::info!(done = progress.done, total = progress.total, "progress");
        }
    }
}

/// Resolve every identifier in the input CSV against the selected stores and
/// write the result table.
///
/// # Errors
///
/// Returns an error if the catalog or input cannot be read, the store
/// selection is invalid, or the output cannot be written.
pub(crate) async fn run_resolve(config: &AppConfig, args: ResolveArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    let stores = pdpscout_core::select_stores(&catalog, &args.stores, &args.custom_stores)?;
    let identifiers = read_identifiers_from_path(&args.input)?;

    let slugs: Vec<&str> = stores.iter().map(|s| s.slug.as_str()).collect();
    tracing::info!(
        input = %args.input.display(),
        identifiers = identifiers.len(),
        stores = %slugs.join(","),
        "resolving"
    );

    let engine = ResolutionEngine::from_app_config(config, &stores)
        .context("failed to build resolution engine")?;
    let table = engine
        .resolve_batch_with_progress(&identifiers, &stores, progress_logger(identifiers.len()))
        .await?;

    match args.output.as_deref() {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_table(&table, args.format, BufWriter::new(file))?;
            eprintln!(
                "wrote {} rows x {} stores to {} ({} found)",
                table.rows.len(),
                table.stores.len(),
                path.display(),
                table.found_count()
            );
        }
        None => write_table(&table, args.format, io::stdout().lock())?,
    }

    Ok(())
}

/// Print the predefined store catalog.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded.
pub(crate) fn run_stores(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(config)?;
    println!("{:<20} {:<22} {:<10} {:<20} BASE URL", "SLUG", "NAME", "PLATFORM", "RESOLVER");
    for store in &catalog {
        let platform = store.platform.map_or("auto", |p| p.as_str());
        println!(
            "{:<20} {:<22} {:<10} {:<20} {}",
            store.slug,
            store.display_name(),
            platform,
            store.resolver.as_str(),
            store.base_url
        );
    }
    Ok(())
}

/// Fetch a page and print the storefront platform its markup points to.
///
/// # Errors
///
/// Returns an error if the page cannot be fetched or answers with a non-200
/// status.
pub(crate) async fn run_classify(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&TransportConfig::from_app_config(config))
        .context("failed to build HTTP client")?;
    let response = transport.get(url).await?;
    if response.status != 200 {
        anyhow::bail!("{url} answered with status {}", response.status);
    }

    let platform = pdpscout_scraper::classify_platform(&response.body);
    println!("{platform}");
    Ok(())
}

