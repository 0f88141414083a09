//! Domain types shared by the pdpscout crates: identifier normalization,
//! storefront platforms, store targets and application configuration.

pub mod app_config;
pub mod config;
pub mod identifier;
pub mod platform;
pub mod stores;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use identifier::{normalize_identifier, normalize_optional};
pub use platform::Platform;
pub use stores::{
    load_stores, normalize_base_url, select_stores, slugify, unique_slug, CustomStore,
    ResolverKind, SelectionError, StoreOrigin, StoreTarget, StoresFile, VerificationPolicy,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),

    #[error("stores validation failed: {0}")]
    Validation(String),
}
