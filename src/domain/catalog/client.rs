//! Catalog sub-client: one-shot bulk listing with an in-memory cache.

use crate::client::ListingsClient;
use crate::domain::catalog::Catalog;
use crate::error::SdkError;
use std::sync::Arc;

/// Sub-client for the coin catalog.
pub struct CatalogClient<'a> {
    pub(crate) client: &'a ListingsClient,
}

impl<'a> CatalogClient<'a> {
    /// Load the full catalog. The first successful load is cached; later calls
    /// return the cached table without touching the network. Concurrent callers
    /// wait for the fetch already in flight instead of starting their own.
    pub async fn load_all(&self) -> Result<Arc<Catalog>, SdkError> {
        if let Some(cached) = self.cached().await {
            return Ok(cached);
        }

        let _loading = self.client.catalog_load.lock().await;
        if let Some(cached) = self.cached().await {
            return Ok(cached);
        }

        let rows = self.client.http.get_coin_list().await?;
        let catalog = Arc::new(Catalog::from(rows));
        tracing::info!(entries = catalog.len(), "Coin catalog loaded");

        *self.client.catalog_cache.write().await = Some(Arc::clone(&catalog));
        Ok(catalog)
    }

    /// The cached catalog, if one has been loaded.
    pub async fn cached(&self) -> Option<Arc<Catalog>> {
        self.client.catalog_cache.read().await.clone()
    }

    /// Drop the cached catalog so the next `load_all` refetches.
    pub async fn clear_cache(&self) {
        *self.client.catalog_cache.write().await = None;
    }
}
