//! High-level client: `ListingsClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, shared cache state, and accessor methods.

use crate::domain::catalog::client::CatalogClient;
use crate::domain::catalog::{Catalog, CatalogEntry};
use crate::domain::market::client::Markets;
use crate::domain::market::Instrument;
use crate::domain::query::QueryDescriptor;
use crate::error::{ErrorKind, SdkError};
use crate::http::{ListingsHttp, RetryPolicy};
use crate::session::{MarketDataSource, ViewerSession, ViewerSessionBuilder};

use async_lock::{Mutex, RwLock};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::market::client::Markets as MarketsClient;

/// The primary entry point for fetching listings.
///
/// Provides nested sub-client accessors for each domain:
/// `client.markets()`, `client.catalog()`. Cheap to clone; clones share the
/// connection pool and the catalog cache.
#[derive(Clone)]
pub struct ListingsClient {
    pub(crate) http: ListingsHttp,
    /// Bulk coin catalog, fetched at most once per successful load.
    pub(crate) catalog_cache: Arc<RwLock<Option<Arc<Catalog>>>>,
    /// Held across a catalog fetch so concurrent loads share one request.
    pub(crate) catalog_load: Arc<Mutex<()>>,
}

impl ListingsClient {
    pub fn builder() -> ListingsClientBuilder {
        ListingsClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn markets(&self) -> Markets<'_> {
        Markets { client: self }
    }

    pub fn catalog(&self) -> CatalogClient<'_> {
        CatalogClient { client: self }
    }

    /// Start a viewer session backed by this client.
    pub fn session(&self) -> ViewerSessionBuilder {
        ViewerSession::builder(Arc::new(self.clone()))
    }

    /// Clear all HTTP caches.
    pub async fn clear_all_caches(&self) {
        self.catalog().clear_cache().await;
    }
}

#[async_trait]
impl MarketDataSource for ListingsClient {
    async fn fetch_markets(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<Instrument>, ErrorKind> {
        self.markets()
            .list(descriptor)
            .await
            .map_err(|e| ErrorKind::from(&e))
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ErrorKind> {
        self.catalog()
            .load_all()
            .await
            .map(|catalog| catalog.entries().to_vec())
            .map_err(|e| ErrorKind::CatalogUnavailable(e.to_string()))
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct ListingsClientBuilder {
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for ListingsClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::Idempotent,
        }
    }
}

impl ListingsClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Per-request transport timeout (native only). Expiry surfaces as
    /// `ErrorKind::Timeout` in the request lifecycle.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<ListingsClient, SdkError> {
        Ok(ListingsClient {
            http: ListingsHttp::new(&self.base_url, self.timeout, self.retry)?,
            catalog_cache: Arc::new(RwLock::new(None)),
            catalog_load: Arc::new(Mutex::new(())),
        })
    }
}
