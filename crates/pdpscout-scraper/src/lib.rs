//! Resolution engine: finds the product detail page of each identifier on
//! each store of a batch.

pub mod batch;
pub mod classify;
pub mod error;
pub mod extract;
pub mod job;
pub mod resolver;
pub mod strategy;
pub mod table;
pub mod transport;
pub mod validate;

pub use batch::{BatchError, BatchProgress, EngineConfig, ResolutionEngine};
pub use classify::classify_platform;
pub use error::ScraperError;
pub use extract::{
    absolutize, extract_api_candidate, extract_html_candidate, Candidate, CandidateSource,
};
pub use job::{JobProgress, JobRegistry, JobStatus, JobTicket, DEFAULT_JOB_RETENTION};
pub use resolver::{
    GenericResolver, MagentoListingResolver, MercadoLibreResolver, PlatformCache,
    PrestaShopListingResolver, ResolveContext, ResolverTable, StoreResolver,
};
pub use strategy::{LookupStrategy, ResponseKind, StrategyRegistry};
pub use table::{Resolution, ResultRow, ResultTable, NOT_FOUND};
pub use transport::{FetchResponse, HttpTransport, Transport, TransportConfig};
pub use validate::is_product_page;
