//! Viewer session: drives a [`QueryState`] against a market-data source.
//!
//! Every command takes the state lock only long enough to mutate the filter and
//! obtain a dispatch ticket; the fetch itself runs unlocked, so commands issued
//! while an earlier fetch is still in flight start their own fetch right away.
//! Whichever completes, only the newest ticket is allowed to change what the
//! table shows.

use crate::domain::catalog::{Catalog, CatalogEntry};
use crate::domain::market::{Instrument, MarketPage};
use crate::domain::query::{
    Dispatch, FilterError, FilterState, PageInfo, QueryDescriptor, QueryState, RequestLifecycle,
    DEFAULT_APPROX_TOTAL_ROWS,
};
use crate::error::{ErrorKind, SdkError};
use crate::shared::{Currency, SortOrder};

use async_lock::{Mutex, RwLock};
use async_trait::async_trait;
use std::sync::Arc;

/// Where listings and the catalog come from.
///
/// Implemented by [`ListingsClient`](crate::client::ListingsClient); tests and
/// offline renderers can supply their own.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch_markets(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<Vec<Instrument>, ErrorKind>;

    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, ErrorKind>;
}

/// What a command did with the remote query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The descriptor did not change; nothing was fetched.
    Unchanged,
    /// The fetch completed and its result (or failure) is now visible.
    Applied { seq: u64 },
    /// The fetch completed after a newer dispatch; its result was discarded.
    Superseded { seq: u64 },
}

/// Catalog load state as seen by the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    NotLoaded,
    Loaded { entries: usize },
    Unavailable(ErrorKind),
}

/// Read-only view of everything the renderer needs.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub filter: FilterState,
    pub lifecycle: RequestLifecycle,
    /// Rows to display: the last accepted success, kept across later failures.
    pub rows: Option<Arc<MarketPage>>,
    /// Error to show, only when there are no rows to display instead.
    pub visible_error: Option<ErrorKind>,
    pub page_info: PageInfo,
    pub search_input: String,
    pub revision: u64,
}

impl ViewSnapshot {
    fn capture(state: &QueryState, approx_total_rows: u64) -> Self {
        Self {
            filter: state.filter().clone(),
            lifecycle: state.lifecycle(),
            rows: state.last_good().cloned(),
            visible_error: state.visible_error().cloned(),
            page_info: state.page_info(approx_total_rows),
            search_input: state.search_input().to_string(),
            revision: state.revision(),
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        self.rows
            .as_deref()
            .map(|page| page.instruments.as_slice())
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_loading()
    }
}

type Listener = Arc<dyn Fn(&ViewSnapshot) + Send + Sync>;

#[derive(Debug)]
struct CatalogSlot {
    catalog: Arc<Catalog>,
    status: CatalogStatus,
}

#[derive(Debug, Clone, Copy)]
struct SessionConfig {
    approx_total_rows: u64,
    suggestion_limit: usize,
}

/// Async driver around the query-state core. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ViewerSession {
    source: Arc<dyn MarketDataSource>,
    state: Arc<RwLock<QueryState>>,
    catalog: Arc<RwLock<CatalogSlot>>,
    /// Held across a catalog fetch so concurrent loads share one request.
    catalog_load: Arc<Mutex<()>>,
    listeners: Arc<RwLock<Vec<Listener>>>,
    config: SessionConfig,
}

impl ViewerSession {
    pub fn builder(source: Arc<dyn MarketDataSource>) -> ViewerSessionBuilder {
        ViewerSessionBuilder {
            source,
            filter: FilterState::default(),
            approx_total_rows: DEFAULT_APPROX_TOTAL_ROWS,
            suggestion_limit: 10,
        }
    }

    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self::builder(source).build()
    }

    // ── Outbound state ───────────────────────────────────────────────────

    pub async fn snapshot(&self) -> ViewSnapshot {
        let state = self.state.read().await;
        ViewSnapshot::capture(&state, self.config.approx_total_rows)
    }

    /// Register a callback invoked with a fresh snapshot after every visible change.
    pub async fn subscribe(&self, listener: impl Fn(&ViewSnapshot) + Send + Sync + 'static) {
        self.listeners.write().await.push(Arc::new(listener));
    }

    pub async fn catalog_status(&self) -> CatalogStatus {
        self.catalog.read().await.status.clone()
    }

    // ── Commands ─────────────────────────────────────────────────────────

    /// Dispatch the initial query for the current (default) filter.
    pub async fn start(&self) -> DispatchOutcome {
        self.command(QueryState::sync).await
    }

    /// Re-fetch the current query even though nothing changed.
    pub async fn refresh(&self) -> DispatchOutcome {
        self.command(|state| Some(state.refresh())).await
    }

    pub async fn set_currency(&self, currency: Currency) -> DispatchOutcome {
        self.command(|state| state.set_currency(currency)).await
    }

    pub async fn set_currency_code(&self, code: &str) -> Result<DispatchOutcome, SdkError> {
        self.try_command(|state| state.set_currency_code(code)).await
    }

    pub async fn set_sort_order(&self, order: SortOrder) -> DispatchOutcome {
        self.command(|state| state.set_sort_order(order)).await
    }

    pub async fn set_sort_order_code(&self, code: &str) -> Result<DispatchOutcome, SdkError> {
        self.try_command(|state| state.set_sort_order_code(code)).await
    }

    pub async fn set_page(
        &self,
        page_number: u32,
        page_size: u32,
    ) -> Result<DispatchOutcome, SdkError> {
        self.try_command(|state| state.set_page(page_number, page_size))
            .await
    }

    pub async fn set_search_term(&self, identifier_or_empty: &str) -> DispatchOutcome {
        self.command(|state| state.set_search_term(identifier_or_empty))
            .await
    }

    pub async fn clear_search(&self) -> DispatchOutcome {
        self.command(QueryState::clear_search).await
    }

    /// Resolve a display name through the catalog and filter by it. Unknown
    /// names (or an unavailable catalog) fall back to no search filter.
    pub async fn select_search_name(&self, name: &str) -> DispatchOutcome {
        let catalog = self.ensure_catalog().await;
        self.command(|state| state.select_search_name(name, &catalog))
            .await
    }

    /// Update the search box text and return the matching suggestions.
    pub async fn set_search_input(&self, text: &str) -> Vec<CatalogEntry> {
        let catalog = self.ensure_catalog().await;
        let (suggestions, changed) = {
            let mut state = self.state.write().await;
            let before = state.revision();
            state.set_search_input(text);
            (
                owned(state.suggestions(&catalog, self.config.suggestion_limit)),
                state.revision() != before,
            )
        };
        if changed {
            self.notify().await;
        }
        suggestions
    }

    /// Commit the pending search input as a name selection.
    pub async fn commit_search_input(&self) -> DispatchOutcome {
        let catalog = self.ensure_catalog().await;
        self.command(|state| state.commit_search_input(&catalog))
            .await
    }

    /// Suggestions for the current search input.
    pub async fn suggestions(&self) -> Vec<CatalogEntry> {
        let catalog = self.current_catalog().await;
        let state = self.state.read().await;
        owned(state.suggestions(&catalog, self.config.suggestion_limit))
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    /// Load the catalog unless it is already loaded. A failure leaves search
    /// working against an empty catalog; call again to retry. Concurrent calls
    /// wait for the fetch in flight and reuse its result.
    pub async fn load_catalog(&self) -> Result<usize, ErrorKind> {
        let _loading = self.catalog_load.lock().await;
        match self.catalog_status().await {
            CatalogStatus::Loaded { entries } => Ok(entries),
            _ => self.install_catalog().await,
        }
    }

    async fn current_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read().await.catalog)
    }

    /// Loads the catalog on first use only; failures are not retried implicitly.
    async fn ensure_catalog(&self) -> Arc<Catalog> {
        if self.catalog_status().await == CatalogStatus::NotLoaded {
            let _loading = self.catalog_load.lock().await;
            if self.catalog_status().await == CatalogStatus::NotLoaded {
                let _ = self.install_catalog().await;
            }
        }
        self.current_catalog().await
    }

    /// Fetches and installs the catalog. Callers hold `catalog_load`.
    async fn install_catalog(&self) -> Result<usize, ErrorKind> {
        match self.source.fetch_catalog().await {
            Ok(entries) => {
                let catalog = Catalog::new(entries);
                let count = catalog.len();
                let mut slot = self.catalog.write().await;
                slot.catalog = Arc::new(catalog);
                slot.status = CatalogStatus::Loaded { entries: count };
                tracing::info!(entries = count, "Search catalog ready");
                Ok(count)
            }
            Err(kind) => {
                let kind = match kind {
                    ErrorKind::CatalogUnavailable(_) => kind,
                    other => ErrorKind::CatalogUnavailable(other.to_string()),
                };
                tracing::warn!(error = %kind, "Search catalog unavailable, suggestions disabled");
                self.catalog.write().await.status = CatalogStatus::Unavailable(kind.clone());
                Err(kind)
            }
        }
    }

    // ── Dispatch plumbing ────────────────────────────────────────────────

    async fn command(
        &self,
        mutate: impl FnOnce(&mut QueryState) -> Option<Dispatch>,
    ) -> DispatchOutcome {
        let (dispatch, changed) = {
            let mut state = self.state.write().await;
            let before = state.revision();
            let dispatch = mutate(&mut state);
            (dispatch, state.revision() != before)
        };
        if changed {
            self.notify().await;
        }
        match dispatch {
            Some(dispatch) => self.execute(dispatch).await,
            None => DispatchOutcome::Unchanged,
        }
    }

    async fn try_command(
        &self,
        mutate: impl FnOnce(&mut QueryState) -> Result<Option<Dispatch>, FilterError>,
    ) -> Result<DispatchOutcome, SdkError> {
        let mut rejected = None;
        let outcome = self
            .command(|state| match mutate(state) {
                Ok(dispatch) => dispatch,
                Err(err) => {
                    rejected = Some(err);
                    None
                }
            })
            .await;

        match rejected {
            Some(err) => {
                tracing::warn!(error = %err, "Rejected filter input, keeping current value");
                Err(err.into())
            }
            None => Ok(outcome),
        }
    }

    async fn execute(&self, dispatch: Dispatch) -> DispatchOutcome {
        let seq = dispatch.seq;
        tracing::debug!(seq, query = ?dispatch.descriptor, "Dispatching markets fetch");

        let outcome = self.source.fetch_markets(&dispatch.descriptor).await;
        let failure = outcome.as_ref().err().cloned();

        let accepted = self.state.write().await.complete(dispatch, outcome);
        match accepted {
            Ok(()) => {
                if let Some(kind) = failure {
                    tracing::warn!(seq, error = %kind, "Markets fetch failed");
                }
                self.notify().await;
                DispatchOutcome::Applied { seq }
            }
            Err(stale) => {
                tracing::debug!(seq, reason = %stale, "Discarding superseded markets response");
                DispatchOutcome::Superseded { seq }
            }
        }
    }

    async fn notify(&self) {
        let listeners = self.listeners.read().await.clone();
        if listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot().await;
        for listener in &listeners {
            listener(&snapshot);
        }
    }
}

fn owned(entries: Vec<&CatalogEntry>) -> Vec<CatalogEntry> {
    entries.into_iter().cloned().collect()
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct ViewerSessionBuilder {
    source: Arc<dyn MarketDataSource>,
    filter: FilterState,
    approx_total_rows: u64,
    suggestion_limit: usize,
}

impl ViewerSessionBuilder {
    /// Start from a filter other than the default `{USD, cap desc, 10, 1, none}`.
    pub fn filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    /// Upper bound reported as the listing's total row count. This is an
    /// approximation for the pager, not a live count.
    pub fn approx_total_rows(mut self, rows: u64) -> Self {
        self.approx_total_rows = rows;
        self
    }

    pub fn suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    pub fn build(self) -> ViewerSession {
        ViewerSession {
            source: self.source,
            state: Arc::new(RwLock::new(QueryState::with_filter(self.filter))),
            catalog: Arc::new(RwLock::new(CatalogSlot {
                catalog: Arc::new(Catalog::empty()),
                status: CatalogStatus::NotLoaded,
            })),
            catalog_load: Arc::new(Mutex::new(())),
            listeners: Arc::new(RwLock::new(Vec::new())),
            config: SessionConfig {
                approx_total_rows: self.approx_total_rows,
                suggestion_limit: self.suggestion_limit,
            },
        }
    }
}
